//! Resolution arbiter.
//!
//! Every message is resolved on its own, with no conversation memory, by
//! trying four tiers in order and stopping at the first that answers:
//!
//! 1. **Item detail**: the best catalog match scores above
//!    [`ArbiterConfig::item_detail_threshold`]; reply with its detail card.
//! 2. **Intent**: a classifier is available and its prediction is confident
//!    above [`ArbiterConfig::intent_threshold`]; reply with one of the
//!    intent's responses.
//! 3. **Item list**: the matcher found looser matches; list them.
//! 4. **Fallback**: the fixed "didn't understand" reply.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogItem, format_item_card};
use crate::matching::{FuzzyItemMatcher, ItemMatch, MatcherConfig};
use crate::ml::IntentClassifier;
use crate::resolution::selector::{RandomSelector, ResponseSelector};

/// Thresholds and fixed texts used by the arbiter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    /// Classifier confidence must be strictly above this to answer.
    pub intent_threshold: f32,
    /// Item similarity must be strictly above this for a detail card.
    pub item_detail_threshold: f64,
    /// First line of the item list reply.
    pub item_list_header: String,
    /// First lines of the fallback reply.
    pub fallback_intro: String,
    /// Topics listed in the fallback reply, one per line.
    pub fallback_topics: Vec<String>,
    /// Contact line closing the fallback reply.
    pub fallback_contact: String,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        ArbiterConfig {
            intent_threshold: 0.30,
            item_detail_threshold: 0.8,
            item_list_header: "Encontré estos platillos:".to_string(),
            fallback_intro: "Lo siento, no entendí bien 😅\nPuedes preguntarme sobre:".to_string(),
            fallback_topics: vec![
                "**Menú** - Ver platillos".to_string(),
                "**Precios** - Costos".to_string(),
                "**Horario** - Cuándo abrimos".to_string(),
                "**Entrega** - Servicio a domicilio".to_string(),
                "**Ordenar** - Hacer pedido".to_string(),
            ],
            fallback_contact: "📲 WhatsApp: **664-563-16-75**".to_string(),
        }
    }
}

impl ArbiterConfig {
    /// The full fallback reply.
    pub fn fallback_text(&self) -> String {
        let mut text = format!("{}\n", self.fallback_intro);
        for topic in &self.fallback_topics {
            text.push_str("• ");
            text.push_str(topic);
            text.push('\n');
        }
        text.push('\n');
        text.push_str(&self.fallback_contact);
        text
    }
}

/// How a message was answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// A single catalog item was named.
    ItemDetail {
        item_id: u64,
        score: f64,
        text: String,
    },
    /// The classifier recognised an intent.
    Intent {
        intent: String,
        confidence: f32,
        text: String,
    },
    /// Several loosely matching catalog items.
    ItemList { item_ids: Vec<u64>, text: String },
    /// Nothing matched.
    Fallback {
        /// Classifier confidence, when a classifier was consulted.
        confidence: Option<f32>,
        text: String,
    },
}

impl Resolution {
    /// The reply text.
    pub fn text(&self) -> &str {
        match self {
            Resolution::ItemDetail { text, .. }
            | Resolution::Intent { text, .. }
            | Resolution::ItemList { text, .. }
            | Resolution::Fallback { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Resolution::ItemDetail { text, .. }
            | Resolution::Intent { text, .. }
            | Resolution::ItemList { text, .. }
            | Resolution::Fallback { text, .. } => text,
        }
    }

    /// Short name of the tier that answered.
    pub fn kind(&self) -> &'static str {
        match self {
            Resolution::ItemDetail { .. } => "item_detail",
            Resolution::Intent { .. } => "intent",
            Resolution::ItemList { .. } => "item_list",
            Resolution::Fallback { .. } => "fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::Fallback { .. })
    }
}

/// Stateless resolver of single messages.
#[derive(Debug, Clone)]
pub struct ResolutionArbiter {
    config: ArbiterConfig,
    matcher: FuzzyItemMatcher,
    selector: Arc<dyn ResponseSelector>,
}

impl Default for ResolutionArbiter {
    fn default() -> Self {
        ResolutionArbiter::new(ArbiterConfig::default(), MatcherConfig::default())
    }
}

impl ResolutionArbiter {
    pub fn new(config: ArbiterConfig, matcher_config: MatcherConfig) -> Self {
        ResolutionArbiter {
            config,
            matcher: FuzzyItemMatcher::new(matcher_config),
            selector: Arc::new(RandomSelector),
        }
    }

    /// Replace the response selector.
    pub fn with_selector(mut self, selector: Arc<dyn ResponseSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn config(&self) -> &ArbiterConfig {
        &self.config
    }

    pub fn matcher(&self) -> &FuzzyItemMatcher {
        &self.matcher
    }

    /// Resolve one message.
    ///
    /// `classifier` is `None` in pattern-only mode; the intent tier is then
    /// skipped.
    pub fn resolve(
        &self,
        message: &str,
        classifier: Option<&IntentClassifier>,
        catalog: &[CatalogItem],
    ) -> Resolution {
        if message.trim().is_empty() {
            debug!("Empty message, using fallback");
            return self.fallback(None);
        }

        let matches = self.matcher.find_matches(message, catalog);
        if let Some(best) = matches
            .first()
            .filter(|m| m.score > self.config.item_detail_threshold)
        {
            debug!(
                "Item detail: '{}' (similarity {:.3})",
                best.item.name, best.score
            );
            return Resolution::ItemDetail {
                item_id: best.item.id,
                score: best.score,
                text: format_item_card(best.item),
            };
        }

        let mut confidence = None;
        if let Some(classifier) = classifier {
            let prediction = classifier.predict(message);
            confidence = Some(prediction.confidence);
            let confident = prediction.confidence > self.config.intent_threshold;
            if let (Some(intent), true) = (prediction.intent, confident) {
                match classifier
                    .responses_for(&intent)
                    .and_then(|responses| self.selector.select(responses))
                {
                    Some(text) => {
                        debug!(
                            "Intent: {intent} ({:.1}%)",
                            prediction.confidence * 100.0
                        );
                        return Resolution::Intent {
                            text: text.to_string(),
                            intent,
                            confidence: prediction.confidence,
                        };
                    }
                    None => debug!("Intent {intent} has no responses, falling through"),
                }
            }
        }

        if !matches.is_empty() {
            debug!("Item list: {} matches", matches.len());
            return self.item_list(&matches);
        }

        debug!("No tier answered, using fallback");
        self.fallback(confidence)
    }

    fn item_list(&self, matches: &[ItemMatch<'_>]) -> Resolution {
        let mut text = format!("{}\n", self.config.item_list_header);
        for m in matches {
            text.push_str(&format_item_card(m.item));
            text.push('\n');
        }
        Resolution::ItemList {
            item_ids: matches.iter().map(|m| m.item.id).collect(),
            text,
        }
    }

    fn fallback(&self, confidence: Option<f32>) -> Resolution {
        Resolution::Fallback {
            confidence,
            text: self.config.fallback_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Corpus, IntentDefinition};
    use crate::ml::TrainingConfig;
    use crate::resolution::selector::FirstSelector;

    fn menu() -> Vec<CatalogItem> {
        vec![
            CatalogItem::new(1, "Chilaquiles Rojos con Huevo", "Totopos en salsa roja", 95.0),
            CatalogItem::new(2, "Chilaquiles Verdes con Huevo", "Totopos en salsa verde", 95.0),
            CatalogItem::new(3, "Café de Olla", "Con canela", 35.0),
        ]
    }

    fn classifier() -> IntentClassifier {
        let corpus = Corpus::new(vec![
            IntentDefinition::new(
                "saludos",
                vec!["hola".into(), "buenos dias".into(), "buenas tardes".into()],
                vec!["¡Hola! ¿Qué se te antoja?".into()],
            ),
            IntentDefinition::new(
                "horario",
                vec![
                    "a que hora abren".into(),
                    "cual es el horario".into(),
                    "a que hora cierran".into(),
                ],
                vec!["Abrimos de 8 a 17 hrs".into()],
            ),
            IntentDefinition::new(
                "menu",
                vec!["que tienen de comer".into(), "quiero ver el menu".into()],
                vec!["Tenemos chilaquiles, enchiladas y más".into()],
            ),
        ])
        .unwrap();
        let config = TrainingConfig {
            epochs: 300,
            learning_rate: 0.005,
            seed: Some(3),
            ..Default::default()
        };
        IntentClassifier::train(&corpus, &config).unwrap()
    }

    fn arbiter() -> ResolutionArbiter {
        ResolutionArbiter::default().with_selector(Arc::new(FirstSelector))
    }

    #[test]
    fn test_fallback_text() {
        let text = ArbiterConfig::default().fallback_text();
        assert_eq!(
            text,
            "Lo siento, no entendí bien 😅\nPuedes preguntarme sobre:\n\
             • **Menú** - Ver platillos\n• **Precios** - Costos\n\
             • **Horario** - Cuándo abrimos\n• **Entrega** - Servicio a domicilio\n\
             • **Ordenar** - Hacer pedido\n\n📲 WhatsApp: **664-563-16-75**"
        );
    }

    #[test]
    fn test_exact_item_name_gets_detail_card() {
        let menu = menu();
        let resolution = arbiter().resolve("chilaquiles rojos con huevo", None, &menu);
        match &resolution {
            Resolution::ItemDetail { item_id, score, .. } => {
                assert_eq!(*item_id, 1);
                assert_eq!(*score, 1.0);
            }
            other => panic!("expected item detail, got {other:?}"),
        }
        assert_eq!(resolution.text(), format_item_card(&menu[0]));
    }

    #[test]
    fn test_item_detail_outranks_intent() {
        let menu = vec![CatalogItem::new(7, "Hola", "Platillo de prueba", 10.0)];
        let classifier = classifier();
        assert_eq!(classifier.predict("hola").intent.as_deref(), Some("saludos"));

        let resolution = arbiter().resolve("Hola!", Some(&classifier), &menu);
        assert_eq!(resolution.kind(), "item_detail");
    }

    #[test]
    fn test_intent_reply() {
        let classifier = classifier();
        let resolution = arbiter().resolve("Hola!", Some(&classifier), &menu());
        match resolution {
            Resolution::Intent {
                intent,
                confidence,
                text,
            } => {
                assert_eq!(intent, "saludos");
                assert!(confidence > 0.30);
                assert_eq!(text, "¡Hola! ¿Qué se te antoja?");
            }
            other => panic!("expected intent, got {other:?}"),
        }
    }

    #[test]
    fn test_loose_matches_are_listed() {
        let menu = menu();
        // Close to both chilaquiles dishes but above 0.8 for neither.
        let query = "chilaquiles huevo";
        let matcher = FuzzyItemMatcher::default();
        assert!(matcher.score(query, &menu[0].name) <= 0.8);
        assert!(matcher.score(query, &menu[0].name) > 0.6);

        let resolution = arbiter().resolve(query, None, &menu);
        match &resolution {
            Resolution::ItemList { item_ids, text } => {
                assert_eq!(item_ids, &vec![1, 2]);
                assert!(text.starts_with("Encontré estos platillos:\n"));
                assert!(text.contains("Chilaquiles Verdes con Huevo"));
            }
            other => panic!("expected item list, got {other:?}"),
        }
    }

    #[test]
    fn test_gibberish_falls_back() {
        let classifier = classifier();
        let resolution = arbiter().resolve("qwxz zzkj", Some(&classifier), &menu());
        assert!(resolution.is_fallback());
        assert_eq!(resolution.text(), ArbiterConfig::default().fallback_text());
    }

    #[test]
    fn test_empty_message_falls_back() {
        let classifier = classifier();
        for message in ["", "   \t"] {
            let resolution = arbiter().resolve(message, Some(&classifier), &menu());
            assert_eq!(
                resolution,
                Resolution::Fallback {
                    confidence: None,
                    text: ArbiterConfig::default().fallback_text(),
                }
            );
        }
    }

    #[test]
    fn test_pattern_only_mode() {
        let resolution = arbiter().resolve("hola", None, &menu());
        assert!(resolution.is_fallback());
    }
}
