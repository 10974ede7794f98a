//! Follow-up recommendations attached to complaint responses.

use crate::types::Category;

const BASE: [&str; 3] = [
    "Conserve el número de radicación para futuras consultas",
    "Puede hacer seguimiento a través del portal web de la Alcaldía",
    "En caso de emergencia, contacte la línea 123",
];

fn specific(category: Category) -> &'static [&'static str] {
    match category {
        Category::RoadsAndPavements => &[
            "Reporte huecos grandes que representen peligro inmediatamente",
            "Proporcione fotos si es posible para acelerar la evaluación",
        ],
        Category::PublicLighting => &[
            "Reporte luminarias dañadas para mejorar la seguridad",
            "En caso de cables caídos, mantenga distancia y reporte inmediatamente",
        ],
        Category::PublicSpaces => &[
            "Participe en jornadas comunitarias de mejoramiento",
            "Reporte vandalismo para mantenimiento preventivo",
        ],
        _ => &[],
    }
}

/// Base recommendations followed by any category-specific ones.
pub fn for_category(category: Category) -> Vec<String> {
    BASE.iter()
        .chain(specific(category))
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_only() {
        let recs = for_category(Category::Signage);
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[2], "En caso de emergencia, contacte la línea 123");
    }

    #[test]
    fn test_category_specific_appended() {
        let recs = for_category(Category::PublicLighting);
        assert_eq!(recs.len(), 5);
        assert!(recs[3].starts_with("Reporte luminarias"));
    }
}
