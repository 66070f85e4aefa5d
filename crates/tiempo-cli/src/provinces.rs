//! Province capitals and their AEMET municipality codes.

/// A province, addressed by the municipality code of its capital.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Province {
    pub name: &'static str,
    pub community: &'static str,
    pub code: &'static str,
}

const fn province(name: &'static str, community: &'static str, code: &'static str) -> Province {
    Province {
        name,
        community,
        code,
    }
}

pub const PROVINCES: &[Province] = &[
    province("Almería", "Andalucía", "04013"),
    province("Cádiz", "Andalucía", "11012"),
    province("Córdoba", "Andalucía", "14021"),
    province("Granada", "Andalucía", "18087"),
    province("Huelva", "Andalucía", "21041"),
    province("Jaén", "Andalucía", "23050"),
    province("Málaga", "Andalucía", "29067"),
    province("Sevilla", "Andalucía", "41091"),
    province("Huesca", "Aragón", "22125"),
    province("Teruel", "Aragón", "44216"),
    province("Zaragoza", "Aragón", "50297"),
    province("Asturias", "Asturias", "33044"),
    province("Islas Baleares", "Islas Baleares", "07040"),
    province("Las Palmas", "Canarias", "35016"),
    province("Santa Cruz de Tenerife", "Canarias", "38038"),
    province("Cantabria", "Cantabria", "39075"),
    province("Albacete", "Castilla-La Mancha", "02003"),
    province("Ciudad Real", "Castilla-La Mancha", "13034"),
    province("Cuenca", "Castilla-La Mancha", "16078"),
    province("Guadalajara", "Castilla-La Mancha", "19130"),
    province("Toledo", "Castilla-La Mancha", "45168"),
    province("Ávila", "Castilla y León", "05019"),
    province("Burgos", "Castilla y León", "09059"),
    province("León", "Castilla y León", "24089"),
    province("Palencia", "Castilla y León", "34120"),
    province("Salamanca", "Castilla y León", "37274"),
    province("Segovia", "Castilla y León", "40194"),
    province("Soria", "Castilla y León", "42173"),
    province("Valladolid", "Castilla y León", "47186"),
    province("Zamora", "Castilla y León", "49275"),
    province("Barcelona", "Cataluña", "08019"),
    province("Girona", "Cataluña", "17079"),
    province("Lleida", "Cataluña", "25120"),
    province("Tarragona", "Cataluña", "43148"),
    province("Badajoz", "Extremadura", "06015"),
    province("Cáceres", "Extremadura", "10037"),
    province("A Coruña", "Galicia", "15030"),
    province("Lugo", "Galicia", "27028"),
    province("Ourense", "Galicia", "32054"),
    province("Pontevedra", "Galicia", "36038"),
    province("Madrid", "Madrid", "28079"),
    province("Murcia", "Murcia", "30030"),
    province("Navarra", "Navarra", "31157"),
    province("Álava", "País Vasco", "01059"),
    province("Gipuzkoa", "País Vasco", "20069"),
    province("Bizkaia", "País Vasco", "48020"),
    province("La Rioja", "La Rioja", "26089"),
    province("Ceuta", "Ceuta y Melilla", "51001"),
    province("Melilla", "Ceuta y Melilla", "52001"),
];

/// Find a province by name, ignoring case and accents.
pub fn find(name: &str) -> Option<&'static Province> {
    let wanted = fold(name.trim());
    PROVINCES.iter().find(|p| fold(p.name) == wanted)
}

/// The alphabetically first province of a community, ignoring case and
/// accents in the community name.
pub fn first_in_community(community: &str) -> Option<&'static Province> {
    let wanted = fold(community.trim());
    PROVINCES
        .iter()
        .filter(|p| fold(p.community) == wanted)
        .min_by_key(|p| fold(p.name))
}

/// Communities in alphabetical order, each with its provinces sorted by name.
pub fn by_community() -> Vec<(&'static str, Vec<&'static Province>)> {
    let mut communities: Vec<&'static str> = PROVINCES.iter().map(|p| p.community).collect();
    communities.sort_by_key(|c| fold(c));
    communities.dedup();

    communities
        .into_iter()
        .map(|community| {
            let mut provinces: Vec<&'static Province> = PROVINCES
                .iter()
                .filter(|p| p.community == community)
                .collect();
            provinces.sort_by_key(|p| fold(p.name));
            (community, provinces)
        })
        .collect()
}

fn fold(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'Á' | 'À' => 'a',
            'é' | 'è' | 'É' | 'È' => 'e',
            'í' | 'ì' | 'Í' | 'Ì' => 'i',
            'ó' | 'ò' | 'Ó' | 'Ò' => 'o',
            'ú' | 'ü' | 'Ú' | 'Ü' => 'u',
            'ñ' | 'Ñ' => 'n',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}
