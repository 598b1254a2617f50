//! Static verse data: book codes and a small table of known verses (LSG).

/// French book name → api.bible book code.
const BOOK_CODES: &[(&str, &str)] = &[
    ("Genèse", "GEN"),
    ("Exode", "EXO"),
    ("Lévitique", "LEV"),
    ("Nombres", "NUM"),
    ("Deutéronome", "DEU"),
    ("Josué", "JOS"),
    ("Juges", "JDG"),
    ("Ruth", "RUT"),
    ("1 Samuel", "1SA"),
    ("2 Samuel", "2SA"),
    ("1 Rois", "1KI"),
    ("2 Rois", "2KI"),
    ("Psaumes", "PSA"),
    ("Matthieu", "MAT"),
    ("Marc", "MRK"),
    ("Luc", "LUK"),
    ("Jean", "JHN"),
    ("Actes", "ACT"),
    ("Romains", "ROM"),
    ("1 Corinthiens", "1CO"),
    ("2 Corinthiens", "2CO"),
    ("Galates", "GAL"),
    ("Éphésiens", "EPH"),
    ("Philippiens", "PHP"),
    ("Colossiens", "COL"),
    ("Apocalypse", "REV"),
];

/// `(book, chapter, verse, text)`, Louis Segond 1910.
const KNOWN_VERSES: &[(&str, u32, u32, &str)] = &[
    ("Genèse", 1, 1, "Au commencement, Dieu créa les cieux et la terre."),
    (
        "Genèse",
        1,
        2,
        "La terre était informe et vide : il y avait des ténèbres à la surface de l'abîme, et l'esprit de Dieu se mouvait au-dessus des eaux.",
    ),
    ("Genèse", 1, 3, "Dieu dit : Que la lumière soit ! Et la lumière fut."),
    (
        "Genèse",
        1,
        4,
        "Dieu vit que la lumière était bonne ; et Dieu sépara la lumière d'avec les ténèbres.",
    ),
    (
        "Genèse",
        1,
        5,
        "Dieu appela la lumière jour, et il appela les ténèbres nuit. Ainsi, il y eut un soir, et il y eut un matin : ce fut le premier jour.",
    ),
    (
        "Genèse",
        1,
        6,
        "Dieu dit : Qu'il y ait une étendue entre les eaux, et qu'elle sépare les eaux d'avec les eaux.",
    ),
    (
        "Genèse",
        1,
        7,
        "Et Dieu fit l'étendue, et il sépara les eaux qui sont au-dessous de l'étendue d'avec les eaux qui sont au-dessus de l'étendue. Et cela fut ainsi.",
    ),
    (
        "Genèse",
        1,
        8,
        "Dieu appela l'étendue ciel. Ainsi, il y eut un soir, et il y eut un matin : ce fut le second jour.",
    ),
    (
        "Genèse",
        1,
        9,
        "Dieu dit : Que les eaux qui sont au-dessous du ciel se rassemblent en un seul lieu, et que le sec paraisse. Et cela fut ainsi.",
    ),
    (
        "Genèse",
        1,
        10,
        "Dieu appela le sec terre, et il appela l'amas des eaux mers. Dieu vit que cela était bon.",
    ),
    (
        "Genèse",
        1,
        11,
        "Puis Dieu dit : Que la terre produise de la verdure, de l'herbe portant de la semence, des arbres fruitiers donnant du fruit selon leur espèce et ayant en eux leur semence sur la terre. Et cela fut ainsi.",
    ),
    (
        "Genèse",
        1,
        12,
        "La terre produisit de la verdure, de l'herbe portant de la semence selon son espèce, et des arbres donnant du fruit et ayant en eux leur semence selon leur espèce. Dieu vit que cela était bon.",
    ),
    (
        "Genèse",
        1,
        13,
        "Ainsi, il y eut un soir, et il y eut un matin : ce fut le troisième jour.",
    ),
    (
        "Genèse",
        1,
        14,
        "Dieu dit : Qu'il y ait des luminaires dans l'étendue du ciel, pour séparer le jour d'avec la nuit ; que ce soient des signes pour marquer les époques, les jours et les années ;",
    ),
    (
        "Genèse",
        1,
        15,
        "et qu'ils servent de luminaires dans l'étendue du ciel, pour éclairer la terre. Et cela fut ainsi.",
    ),
    (
        "Genèse",
        1,
        16,
        "Dieu fit les deux grands luminaires, le plus grand luminaire pour présider au jour, et le plus petit luminaire pour présider à la nuit ; il fit aussi les étoiles.",
    ),
    (
        "Genèse",
        1,
        17,
        "Dieu les plaça dans l'étendue du ciel, pour éclairer la terre,",
    ),
    (
        "Genèse",
        1,
        18,
        "pour présider au jour et à la nuit, et pour séparer la lumière d'avec les ténèbres. Dieu vit que cela était bon.",
    ),
    (
        "Genèse",
        1,
        19,
        "Ainsi, il y eut un soir, et il y eut un matin : ce fut le quatrième jour.",
    ),
    (
        "Genèse",
        1,
        20,
        "Dieu dit : Que les eaux produisent en abondance des animaux vivants, et que des oiseaux volent sur la terre vers l'étendue du ciel.",
    ),
    (
        "Jean",
        3,
        16,
        "Car Dieu a tant aimé le monde qu'il a donné son Fils unique, afin que quiconque croit en lui ne périsse point, mais qu'il ait la vie éternelle.",
    ),
    (
        "Matthieu",
        5,
        3,
        "Heureux les pauvres en esprit, car le royaume des cieux est à eux !",
    ),
    ("Matthieu", 5, 4, "Heureux les affligés, car ils seront consolés !"),
    (
        "Matthieu",
        5,
        5,
        "Heureux les débonnaires, car ils hériteront la terre !",
    ),
];

/// api.bible code for a French book name, if known.
pub fn book_code(book: &str) -> Option<&'static str> {
    BOOK_CODES
        .iter()
        .find(|(name, _)| *name == book)
        .map(|(_, code)| *code)
}

/// Built-in text for a verse, if present in the table.
pub fn known_verse(book: &str, chapter: u32, verse: u32) -> Option<&'static str> {
    KNOWN_VERSES
        .iter()
        .find(|(b, c, v, _)| *b == book && *c == chapter && *v == verse)
        .map(|(_, _, _, text)| *text)
}

/// Placeholder line used when no text is available.
pub fn generic_verse(book: &str, chapter: u32, verse: u32) -> String {
    format!("Parole de Dieu pour {book} {chapter}:{verse} - Méditation sur la sagesse divine.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_codes() {
        assert_eq!(book_code("Genèse"), Some("GEN"));
        assert_eq!(book_code("2 Rois"), Some("2KI"));
        assert_eq!(book_code("Jean"), Some("JHN"));
        assert_eq!(book_code("Néhémie"), None);
    }

    #[test]
    fn known_verses() {
        assert_eq!(
            known_verse("Genèse", 1, 1),
            Some("Au commencement, Dieu créa les cieux et la terre.")
        );
        assert!(known_verse("Jean", 3, 16).unwrap().starts_with("Car Dieu a tant aimé"));
        assert!(known_verse("Genèse", 1, 21).is_none());
        assert!(known_verse("Genèse", 2, 1).is_none());
    }

    #[test]
    fn genesis_one_is_complete_through_twenty() {
        assert!((1..=20).all(|v| known_verse("Genèse", 1, v).is_some()));
    }

    #[test]
    fn generic_line() {
        assert_eq!(
            generic_verse("Ruth", 2, 4),
            "Parole de Dieu pour Ruth 2:4 - Méditation sur la sagesse divine."
        );
    }
}
