//! Multi-section study pipeline: rubric catalogue, prompts and output
//! post-processing.
//!
//! The orchestration itself lives on
//! [`StudyGateway::generate_study`](crate::StudyGateway::generate_study);
//! this module holds the pure pieces it is built from.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::passage::{MAX_VERSES, Passage};

/// The study rubrics. Index 0 is the verse-by-verse study, 1..=28 the
/// numbered rubrics.
pub const RUBRICS: [&str; 29] = [
    "Étude verset par verset",
    "Prière d'ouverture",
    "Structure littéraire",
    "Questions du chapitre précédent",
    "Thème doctrinal",
    "Fondements théologiques",
    "Contexte historique",
    "Contexte culturel",
    "Contexte géographique",
    "Analyse lexicale",
    "Parallèles bibliques",
    "Prophétie et accomplissement",
    "Personnages",
    "Structure rhétorique",
    "Théologie trinitaire",
    "Christ au centre",
    "Évangile et grâce",
    "Application personnelle",
    "Application communautaire",
    "Prière de réponse",
    "Questions d'étude",
    "Points de vigilance",
    "Objections et réponses",
    "Perspective missionnelle",
    "Éthique chrétienne",
    "Louange / liturgie",
    "Méditation guidée",
    "Mémoire / versets clés",
    "Plan d'action",
];

/// Maximum number of rubrics generated per request.
pub const MAX_RUBRICS: usize = 5;

/// Source label for content assembled without the primary provider.
pub const FALLBACK_SOURCE: &str = "fallback";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyRequest {
    pub passage: String,
    /// Rubric indices to generate; `None` means the first five.
    #[serde(default)]
    pub rubrics: Option<Vec<usize>>,
    #[serde(default = "default_use_primary")]
    pub use_primary: bool,
}

fn default_use_primary() -> bool {
    true
}

impl StudyRequest {
    pub fn new(passage: impl Into<String>) -> Self {
        Self {
            passage: passage.into(),
            rubrics: None,
            use_primary: true,
        }
    }

    pub fn rubrics(mut self, rubrics: impl Into<Vec<usize>>) -> Self {
        self.rubrics = Some(rubrics.into());
        self
    }

    pub fn use_primary(mut self, use_primary: bool) -> Self {
        self.use_primary = use_primary;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyOutput {
    pub content: String,
    pub source: String,
    pub rubrics_generated: usize,
    pub from_cache: bool,
}

/// Rubric indices to generate: the requested ones that exist, at most
/// [`MAX_RUBRICS`], or `0..5` when none were requested.
pub fn select_rubrics(requested: Option<&[usize]>) -> Vec<usize> {
    match requested {
        Some(indices) if !indices.is_empty() => indices
            .iter()
            .copied()
            .filter(|&i| i < RUBRICS.len())
            .take(MAX_RUBRICS)
            .collect(),
        _ => (0..MAX_RUBRICS).collect(),
    }
}

/// Section title as it appears after `## `.
pub fn section_title(index: usize) -> String {
    let title = RUBRICS.get(index).copied().unwrap_or_default();
    if index == 0 {
        format!("Étude verset par verset: {title}")
    } else {
        format!("Rubrique {index}: {title}")
    }
}

pub fn section_header(index: usize) -> String {
    format!("## {}", section_title(index))
}

/// Prompt asking the primary provider for the selected rubrics.
pub fn rubric_prompt(passage: &str, rubrics: &[usize]) -> String {
    let mut lines = vec![
        format!("Créez une étude biblique théologique pour le passage {passage}."),
        String::new(),
    ];
    for &index in rubrics {
        lines.push("Générez du contenu substantiel pour :".to_string());
        lines.push(section_header(index));
        lines.push(format!("Adaptez spécifiquement au passage {passage}."));
        lines.push(String::new());
    }
    lines.extend(
        [
            "INSTRUCTIONS CRITIQUES :",
            "1. Utilisez EXACTEMENT les titres de rubriques indiqués ci-dessus",
            "2. Contenu unique et spécifique au passage biblique",
            "3. Langage théologique érudit et précis",
            "4. 150-200 mots par rubrique minimum",
            "5. AUCUN contenu générique type 'sera généré automatiquement'",
            "",
            "IMPORTANT : Respectez EXACTEMENT la numérotation des rubriques demandées !",
        ]
        .map(String::from),
    );
    lines.join("\n")
}

/// Prompt for a verse-by-verse generation of `passage`.
pub fn verse_prompt(passage: &Passage) -> String {
    let coverage = match passage.verses {
        Some(_) => "Assurez-vous que chaque verset a sa propre section distincte et complète.".to_string(),
        None => format!("Couvrez les versets 1 à {MAX_VERSES} du chapitre {passage}."),
    };
    format!(
        "Analyse théologique approfondie du passage biblique : {passage}\n\n\
         Fournissez une étude verset par verset (au plus {MAX_VERSES} versets) avec le format exact suivant pour chaque verset :\n\n\
         **VERSET [numéro]**\n\n\
         **TEXTE BIBLIQUE :**\n\
         [texte biblique authentique du verset]\n\n\
         **EXPLICATION THÉOLOGIQUE :**\n\
         [analyse théologique approfondie de 120-180 mots]\n\n\
         {coverage}"
    )
}

/// Whether generated study content came back in the per-verse format.
pub fn is_verse_format(content: &str) -> bool {
    content.to_uppercase().contains("**VERSET")
}

static RUBRIC_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"## Rubrique \d+:").expect("valid regex"));

/// When a single numbered rubric was requested, force every
/// `## Rubrique N:` header to that number.
pub fn renumber(content: &str, rubrics: &[usize]) -> String {
    match rubrics {
        [index] if *index > 0 => RUBRIC_HEADER
            .replace_all(content, format!("## Rubrique {index}:").as_str())
            .into_owned(),
        _ => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_has_twenty_nine_entries() {
        assert_eq!(RUBRICS.len(), 29);
        assert_eq!(RUBRICS[0], "Étude verset par verset");
        assert_eq!(RUBRICS[28], "Plan d'action");
    }

    #[test]
    fn default_selection_is_first_five() {
        assert_eq!(select_rubrics(None), vec![0, 1, 2, 3, 4]);
        assert_eq!(select_rubrics(Some(&[][..])), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn selection_skips_unknown_and_caps() {
        assert_eq!(select_rubrics(Some(&[3, 99, 7][..])), vec![3, 7]);
        assert_eq!(
            select_rubrics(Some(&[1, 2, 3, 4, 5, 6, 7][..])),
            vec![1, 2, 3, 4, 5]
        );
    }

    #[test]
    fn headers() {
        assert_eq!(
            section_header(0),
            "## Étude verset par verset: Étude verset par verset"
        );
        assert_eq!(section_header(9), "## Rubrique 9: Analyse lexicale");
    }

    #[test]
    fn rubric_prompt_lists_sections() {
        let prompt = rubric_prompt("Jean 3", &[1, 15]);
        assert!(prompt.starts_with("Créez une étude biblique théologique pour le passage Jean 3."));
        assert!(prompt.contains("## Rubrique 1: Prière d'ouverture"));
        assert!(prompt.contains("## Rubrique 15: Christ au centre"));
        assert!(!prompt.contains("Rubrique 2:"));
    }

    #[test]
    fn verse_prompt_mentions_format() {
        let passage = Passage::parse("Genèse 1").unwrap();
        let prompt = verse_prompt(&passage);
        assert!(prompt.contains("**VERSET [numéro]**"));
        assert!(prompt.contains("Couvrez les versets 1 à 5 du chapitre Genèse 1."));
    }

    #[test]
    fn detects_verse_format() {
        assert!(is_verse_format("**Verset 1**\n..."));
        assert!(!is_verse_format("## Rubrique 1: Prière"));
    }

    #[test]
    fn renumbers_single_rubric() {
        let content = "## Rubrique 1: Contexte historique\ntext\n## Rubrique 2: x";
        assert_eq!(
            renumber(content, &[6]),
            "## Rubrique 6: Contexte historique\ntext\n## Rubrique 6: x"
        );
        assert_eq!(renumber(content, &[0]), content);
        assert_eq!(renumber(content, &[1, 2]), content);
    }
}
