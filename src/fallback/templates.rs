//! Commentary templates for fallback content.

use crate::passage::LengthBand;

/// Themes and framing used for per-verse commentary of one book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookTemplate {
    pub themes: &'static [&'static str],
    pub context: &'static str,
}

impl BookTemplate {
    /// Theme for the `number`-th displayed verse (1-based), rotating.
    pub fn theme(&self, number: usize) -> &'static str {
        self.themes[number.saturating_sub(1) % self.themes.len()]
    }
}

const GENESIS: BookTemplate = BookTemplate {
    themes: &[
        "création",
        "commencement",
        "image de Dieu",
        "alliance",
        "promesse",
    ],
    context: "livre des origines et des fondements de la foi",
};

const EXODUS: BookTemplate = BookTemplate {
    themes: &[
        "libération",
        "alliance sinaïtique",
        "loi divine",
        "sanctuaire",
    ],
    context: "livre de la rédemption et de l'alliance",
};

const MATTHEW: BookTemplate = BookTemplate {
    themes: &[
        "royaume des cieux",
        "accomplissement",
        "messie",
        "enseignement",
    ],
    context: "évangile du roi et du royaume",
};

const DEFAULT_TEMPLATE: BookTemplate = BookTemplate {
    themes: &["révélation divine", "sagesse", "obéissance", "espérance"],
    context: "texte biblique inspiré",
};

pub fn book_template(book: &str) -> BookTemplate {
    match book {
        "Genèse" => GENESIS,
        "Exode" => EXODUS,
        "Matthieu" => MATTHEW,
        _ => DEFAULT_TEMPLATE,
    }
}

/// Literary genre of a book, `"biblique"` when unknown.
pub fn literary_genre(book: &str) -> &'static str {
    match book {
        "Genèse" => "narratif fondationnel",
        "Exode" => "narratif légal",
        "Matthieu" | "Marc" | "Luc" | "Jean" => "évangélique",
        "Romains" => "épistolaire doctrinal",
        "Psaumes" => "poétique et liturgique",
        "Apocalypse" => "apocalyptique prophétique",
        _ => "biblique",
    }
}

/// Commentary for one verse of `book`, built around `theme`.
pub fn verse_commentary(book: &str, theme: &str, band: LengthBand) -> String {
    let template = book_template(book);
    format!(
        "Ce verset du {context}, de style {genre}, révèle des aspects importants de {theme}. \
         L'analyse {length} de ce passage nous invite à méditer sur la profondeur de la révélation divine \
         et son application dans notre compréhension de la foi chrétienne. \
         La richesse théologique de ce texte mérite une étude attentive pour en saisir toute la portée spirituelle.",
        context = template.context,
        genre = literary_genre(book),
        length = band.label(),
    )
}

/// Content returned when every source failed.
pub fn error_notice(passage: &str) -> String {
    format!(
        "**INFORMATION**\n\n\
         Désolé, impossible de récupérer le contenu pour {passage}.\n\n\
         **SUGGESTION :**\n\
         Veuillez vérifier votre connexion et réessayer."
    )
}

/// Study section body for a rubric, framing the retrieved `text`.
pub fn rubric_analysis(title: &str, passage: &str, text: &str) -> String {
    specific_rubric(title, passage, text).unwrap_or_else(|| themed_rubric(title, passage, text))
}

fn specific_rubric(title: &str, passage: &str, text: &str) -> Option<String> {
    let body = match title {
        "Prière d'ouverture" => format!(
            "Père céleste, Créateur de toutes choses, nous voici rassemblés devant la majesté de Ta Parole, \
             le cœur débordant de reconnaissance pour cette grâce immense que Tu nous accordes. En ouvrant {passage}, \
             nous pénétrons dans le sanctuaire de Ta révélation où chaque mot porte l'empreinte de Ta sagesse éternelle.\n\n\
             {text}\n\n\
             Nous reconnaissons que sans l'illumination de Ton Saint-Esprit, nos yeux demeurent voilés et notre intelligence obscurcie. \
             Viens donc, Esprit de vérité, pénètre les profondeurs de nos âmes. Que cette étude ne soit pas un simple exercice \
             intellectuel, mais une véritable rencontre transformatrice avec le Dieu vivant.\n\n\
             Nous Te prions de nous révéler les trésors cachés de {passage}, ces richesses spirituelles que seul l'Esprit peut \
             dévoiler à ceux qui cherchent Ta face avec sincérité. Que notre étude porte des fruits durables pour Ta gloire et \
             l'édification mutuelle, au nom précieux de Jésus-Christ notre Seigneur. Amen."
        ),
        "Structure littéraire" => format!(
            "En contemplant {passage}, nous découvrons avec émerveillement l'architecture que l'Esprit Saint a tissée dans ce \
             texte inspiré. Chaque phrase, chaque transition, chaque répétition concourt à une œuvre littéraire d'une beauté saisissante.\n\n\
             {text}\n\n\
             L'auteur sacré déploie devant nous une structure narrative qui dépasse les simples considérations stylistiques. \
             Les répétitions ne sont pas des redondances, mais des refrains spirituels qui ancrent les vérités essentielles dans nos cœurs.\n\n\
             Cette organisation révèle la pédagogie divine à l'œuvre. La progression du récit nous conduit des réalités visibles \
             vers les vérités invisibles, de l'historique vers l'éternel. Ainsi, la forme devient message, et la structure se fait révélation."
        ),
        "Questions du chapitre précédent" => format!(
            "Aborder {passage} sans considérer le chemin parcouru dans les chapitres précédents reviendrait à contempler un tableau \
             en ne regardant qu'un seul détail. L'Écriture se déploie comme une cathédrale où chaque pierre trouve son sens dans \
             l'architecture globale de la révélation.\n\n\
             {text}\n\n\
             Lorsque nous remontons le fil de la narration biblique, nous découvrons comment Dieu prépare méthodiquement le terrain \
             pour chaque nouvelle révélation. Les interrogations soulevées dans les passages antérieurs ne sont jamais laissées sans réponse.\n\n\
             Les questions d'hier deviennent les fondements des réponses d'aujourd'hui, et les mystères présents préparent les \
             illuminations futures. Cette marche progressive cultive en nous l'humilité de l'apprenant et la confiance en Celui qui détient toute sagesse."
        ),
        "Fondements théologiques" => format!(
            "L'étude des fondements théologiques de {passage} nous conduit au cœur des vérités essentielles qui sous-tendent \
             l'architecture de la foi chrétienne. Ce texte constitue un pilier doctrinal qui éclaire notre compréhension de Dieu \
             et de son œuvre dans l'histoire.\n\n\
             {text}\n\n\
             Les fondements révélés dans ce passage touchent aux questions les plus profondes de l'existence : la nature de Dieu, \
             sa souveraineté, sa justice et sa grâce.\n\n\
             Nous découvrons que la théologie n'est pas une discipline abstraite, mais une réalité vivante qui transforme notre \
             vision du monde et notre relation avec le Créateur."
        ),
        "Contexte historique" => format!(
            "Pour saisir pleinement la portée de {passage}, il est essentiel de plonger dans le contexte historique qui a vu naître \
             ce texte. L'histoire n'est jamais neutre dans l'Écriture ; elle constitue le théâtre choisi par Dieu pour révéler sa volonté.\n\n\
             {text}\n\n\
             L'époque qui encadre ces événements était marquée par des bouleversements politiques, sociaux et spirituels considérables. \
             Dans ce tourbillon, Dieu continue d'œuvrer, utilisant les circonstances humaines pour faire avancer son plan rédempteur.\n\n\
             Cette analyse nous enseigne que Dieu n'est pas un observateur distant de l'histoire humaine, mais qu'il en est le \
             souverain orchestrateur."
        ),
        "Contexte culturel" => format!(
            "La richesse culturelle qui entoure {passage} ouvre des perspectives fascinantes sur la manière dont Dieu communique \
             à travers les particularités de chaque époque. Les coutumes et les traditions de l'ancien monde constituent un prisme \
             à travers lequel la révélation prend une couleur particulière.\n\n\
             {text}\n\n\
             Les codes sociaux, les structures familiales et les traditions religieuses de l'époque offrent un cadre interprétatif \
             précieux pour comprendre les enjeux spirituels sous-jacents.\n\n\
             Cette immersion culturelle nous aide à franchir le pont qui sépare notre monde de celui des auteurs bibliques, \
             et révèle l'universalité d'un message qui s'incarne pourtant dans des contextes spécifiques."
        ),
        "Thème doctrinal" => format!(
            "Pénétrer dans les profondeurs doctrinales de {passage}, c'est s'aventurer dans les mines d'or de la vérité divine \
             où chaque verset recèle des trésors théologiques.\n\n\
             {text}\n\n\
             L'enseignement qui émane de ces versets nous confronte aux réalités les plus essentielles : qui est Dieu, comment \
             s'articulent sa justice et sa miséricorde, et de quelle manière Il entre en relation avec sa création.\n\n\
             Les vérités qui se dessinent dans ce passage résonnent harmonieusement avec l'ensemble des Écritures, confirmant \
             que nous avons affaire à une révélation unique et unifiée."
        ),
        "Analyse lexicale" => format!(
            "Les mots de {passage} portent en eux une puissance qui dépasse leur simple définition lexicographique. \
             L'étude du vocabulaire original nous ouvre les portes d'un trésor linguistique où chaque nuance révèle une facette \
             nouvelle de la vérité révélée.\n\n\
             {text}\n\n\
             L'hébreu et le grec bibliques possèdent une richesse sémantique qui défie toute traduction exhaustive. Derrière \
             chaque mot se cache souvent un univers conceptuel entier.\n\n\
             Rien n'est laissé au hasard dans l'Écriture : chaque terme est pesé pour transmettre exactement la nuance de vérité \
             que Dieu souhaite communiquer."
        ),
        _ => return None,
    };
    Some(body)
}

/// `(theme adjective, focus phrase)` keyed by words found in a rubric title.
const KEYWORD_THEMES: &[(&[&str], &str, &str)] = &[
    (
        &["géographique", "géographie"],
        "géographique",
        "la géographie sacrée et les lieux significatifs",
    ),
    (
        &["lexical", "vocabulaire"],
        "lexical",
        "les richesses du vocabulaire hébreu et grec",
    ),
    (
        &["rhétorique"],
        "rhétorique",
        "l'art oratoire et les procédés littéraires",
    ),
    (
        &["trinité", "trinitaire"],
        "trinitaire",
        "la révélation progressive de la Trinité",
    ),
    (
        &["christ", "christologique"],
        "christologique",
        "la préfiguration et l'annonce du Christ",
    ),
    (
        &["eschatologique", "prophétique"],
        "eschatologique",
        "les perspectives d'éternité et les promesses futures",
    ),
    (
        &["pastoral", "ministère"],
        "pastoral",
        "l'édification et le soin des âmes",
    ),
    (
        &["éthique", "moral"],
        "éthique",
        "les principes moraux et leur application pratique",
    ),
];

/// Theme adjective and focus phrase for a rubric title.
pub fn rubric_theme(title: &str) -> (&'static str, &'static str) {
    let title = title.to_lowercase();
    KEYWORD_THEMES
        .iter()
        .find(|(keywords, _, _)| keywords.iter().any(|k| title.contains(k)))
        .map(|(_, theme, focus)| (*theme, *focus))
        .unwrap_or(("théologique", "les dimensions spirituelles profondes"))
}

fn themed_rubric(title: &str, passage: &str, text: &str) -> String {
    let (theme, focus) = rubric_theme(title);
    format!(
        "L'exploration {theme} de {passage} nous ouvre des horizons remarquables sur {focus} qui caractérisent ce texte inspiré. \
         Cette approche particulière révèle des facettes souvent méconnues de la révélation divine.\n\n\
         {text}\n\n\
         Cette perspective {theme} enrichit considérablement notre compréhension du dessein divin tel qu'il se déploie dans ce passage. \
         Les nuances révélées par cette approche ajoutent une profondeur nouvelle à notre appréciation du texte sacré.\n\n\
         L'étude sous cet angle nous conduit à découvrir des connexions insoupçonnées avec l'ensemble de la révélation biblique.\n\n\
         Cette analyse {theme} contribue ainsi à notre édification spirituelle et à notre croissance dans la connaissance de Dieu \
         et de ses voies parfaites."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn themes_rotate() {
        let t = book_template("Exode");
        assert_eq!(t.theme(1), "libération");
        assert_eq!(t.theme(4), "sanctuaire");
        assert_eq!(t.theme(5), "libération");
    }

    #[test]
    fn unknown_book_uses_default_template() {
        assert_eq!(book_template("Ruth"), DEFAULT_TEMPLATE);
    }

    #[test]
    fn commentary_mentions_context_theme_and_band() {
        let t = book_template("Genèse");
        let text = verse_commentary("Genèse", t.theme(1), LengthBand::Developed);
        assert!(text.starts_with("Ce verset du livre des origines"));
        assert!(text.contains("de style narratif fondationnel"));
        assert!(text.contains("de création."));
        assert!(text.contains("L'analyse développé"));
    }

    #[test]
    fn genres() {
        assert_eq!(literary_genre("Luc"), "évangélique");
        assert_eq!(literary_genre("Psaumes"), "poétique et liturgique");
        assert_eq!(literary_genre("Ruth"), "biblique");
    }

    #[test]
    fn keyword_themes() {
        assert_eq!(rubric_theme("Contexte géographique").0, "géographique");
        assert_eq!(rubric_theme("Christ au centre").0, "christologique");
        assert_eq!(rubric_theme("Théologie trinitaire").0, "trinitaire");
        assert_eq!(rubric_theme("Éthique chrétienne").0, "éthique");
        assert_eq!(rubric_theme("Plan d'action").0, "théologique");
    }

    #[test]
    fn specific_templates_embed_text() {
        let body = rubric_analysis("Prière d'ouverture", "Jean 3", "16. Car Dieu");
        assert!(body.starts_with("Père céleste"));
        assert!(body.contains("16. Car Dieu"));
        assert!(body.contains("Jean 3"));

        let body = rubric_analysis("Parallèles bibliques", "Jean 3", "x");
        assert!(body.starts_with("L'exploration théologique de Jean 3"));
    }

    #[test]
    fn notice_names_passage() {
        let notice = error_notice("Jean 3:16");
        assert!(notice.starts_with("**INFORMATION**"));
        assert!(notice.contains("impossible de récupérer le contenu pour Jean 3:16"));
    }
}
