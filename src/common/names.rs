/// Accented letters that appear in state names, with their plain replacements.
const TRANSLITERATIONS: [(char, char); 6] = [
    ('á', 'a'), ('é', 'e'), ('í', 'i'), ('ó', 'o'), ('ú', 'u'), ('ñ', 'n'),
];

/// File-name-safe form of a state name: lowercase, spaces to underscores, accents stripped.
pub fn safe_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' => '_',
            c => TRANSLITERATIONS.iter()
                .find(|&&(accented, _)| accented == c)
                .map_or(c, |&(_, plain)| plain),
        })
        .collect()
}

/// Output file name for one map variant of one state.
pub fn map_file_name(variant: &str, code: &str, name: &str) -> String {
    format!("{variant}_{code}_{}.png", safe_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_spaces() {
        assert_eq!(safe_name("México"), "mexico");
        assert_eq!(safe_name("Nuevo León"), "nuevo_leon");
        assert_eq!(safe_name("San Luis Potosí"), "san_luis_potosi");
        assert_eq!(safe_name("Estado de México"), "estado_de_mexico");
        assert_eq!(safe_name("Querétaro"), "queretaro");
    }

    #[test]
    fn plain_names_are_only_lowercased() {
        assert_eq!(safe_name("Baja California Sur"), "baja_california_sur");
        assert_eq!(safe_name("Colima"), "colima");
    }

    #[test]
    fn file_name_pattern() {
        assert_eq!(map_file_name("typemap", "19", "Nuevo León"), "typemap_19_nuevo_leon.png");
    }
}
