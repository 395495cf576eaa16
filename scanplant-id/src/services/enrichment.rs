//! Curated care/description enrichment
//!
//! Resolves curated plant information from a static knowledge base. Never
//! fails outward: every path resolves to an entry, a synthesized generic
//! entry, or the "unavailable" triple.

use scanplant_common::config::KnowledgeBaseEntryConfig;
use std::time::Duration;

/// Common-name sentinel used when enrichment cannot resolve anything
pub const ENRICHMENT_COMMON_NAME_UNAVAILABLE: &str = "Nome comum não disponível";

/// Description sentinel used when enrichment cannot resolve anything
pub const ENRICHMENT_DESCRIPTION_UNAVAILABLE: &str = "Descrição não disponível no momento.";

/// Care sentinel used when enrichment cannot resolve anything
pub const ENRICHMENT_CARE_UNAVAILABLE: &str =
    "Instruções de cuidado não disponíveis no momento.";

/// Curated triple produced by the resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedInfo {
    pub common_name: String,
    pub enhanced_description: String,
    pub care_instructions: String,
}

impl EnrichedInfo {
    /// The fixed "unavailable" triple
    pub fn unavailable() -> Self {
        Self {
            common_name: ENRICHMENT_COMMON_NAME_UNAVAILABLE.to_string(),
            enhanced_description: ENRICHMENT_DESCRIPTION_UNAVAILABLE.to_string(),
            care_instructions: ENRICHMENT_CARE_UNAVAILABLE.to_string(),
        }
    }
}

/// One curated knowledge-base entry, keyed by a species or genus token
#[derive(Debug, Clone)]
pub struct KnowledgeBaseEntry {
    pub key: String,
    pub common_name: String,
    pub enhanced_description: String,
    pub care_instructions: String,
}

impl From<KnowledgeBaseEntryConfig> for KnowledgeBaseEntry {
    fn from(c: KnowledgeBaseEntryConfig) -> Self {
        Self {
            key: c.key,
            common_name: c.common_name,
            enhanced_description: c.enhanced_description,
            care_instructions: c.care_instructions,
        }
    }
}

/// Static, read-only, insertion-ordered table of curated entries
///
/// Insertion order matters: the keyword fallback tries entries in order and
/// the first match wins.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeBaseEntry>,
}

impl KnowledgeBase {
    /// Build from injected entries (e.g. the TOML config)
    pub fn new(entries: Vec<KnowledgeBaseEntry>) -> Self {
        Self { entries }
    }

    /// Compiled-in default entries
    pub fn builtin() -> Self {
        let entry = |key: &str, common: &str, desc: &str, care: &str| KnowledgeBaseEntry {
            key: key.to_string(),
            common_name: common.to_string(),
            enhanced_description: desc.to_string(),
            care_instructions: care.to_string(),
        };
        Self::new(vec![
            entry(
                "Rosa",
                "Rosa",
                "A rosa é uma das plantas ornamentais mais cultivadas e admiradas no mundo, \
                 pertencente à família Rosaceae. Suas flores variam do branco puro ao vermelho \
                 intenso e simbolizam amor, paixão e beleza em diversas culturas, com uso em \
                 perfumaria, culinária e medicina tradicional.",
                "• Rega: 2-3 vezes por semana pela manhã, evitando molhar folhas\n\
                 • Luz: Sol pleno (mínimo 6 horas diárias)\n\
                 • Solo: Bem drenado, rico em matéria orgânica, pH entre 6,0-7,0\n\
                 • Temperatura: 15-25°C\n\
                 • Poda: Remover flores murchas e galhos secos no inverno",
            ),
            entry(
                "Aloe vera",
                "Babosa",
                "A Aloe vera, conhecida popularmente como babosa, é uma suculenta medicinal da \
                 família Asphodelaceae, originária da Península Arábica e norte da África. Suas \
                 folhas carnosas armazenam um gel rico em compostos ativos, reconhecido por \
                 propriedades cicatrizantes, anti-inflamatórias e hidratantes.",
                "• Rega: 1 vez por semana no verão, quinzenal no inverno\n\
                 • Luz: Luz indireta brilhante, evitar sol direto intenso\n\
                 • Solo: Bem drenado, específico para suculentas\n\
                 • Temperatura: 18-27°C, não tolera geadas\n\
                 • Drenagem: Essencial para evitar apodrecimento das raízes",
            ),
            entry(
                "Ficus",
                "Ficus",
                "O Ficus é um gênero diversificado da família Moraceae, com mais de 800 espécies \
                 de árvores, arbustos e trepadeiras de regiões tropicais. É reconhecido por folhas \
                 brilhantes e coriáceas, grande adaptabilidade a ambientes internos e externos e \
                 capacidade de purificar o ar.",
                "• Rega: Manter solo levemente úmido, sem encharcar\n\
                 • Luz: Sol pleno a meia sombra\n\
                 • Solo: Fértil, bem drenado e rico em matéria orgânica\n\
                 • Temperatura: 20-30°C\n\
                 • Poda: Pode ser podado para controlar tamanho e forma",
            ),
            entry(
                "Monstera",
                "Costela-de-Adão",
                "A Monstera deliciosa, popularmente conhecida como Costela-de-Adão, é uma \
                 trepadeira tropical da família Araceae, nativa das florestas do México e América \
                 Central. É famosa pelas folhas gigantes com perfurações naturais (fenestração) e \
                 é uma das plantas de interior mais populares.",
                "• Rega: 1-2 vezes por semana, solo úmido mas nunca encharcado\n\
                 • Luz: Luz indireta brilhante, evitar sol direto\n\
                 • Solo: Rico em matéria orgânica, bem drenado e aerado\n\
                 • Temperatura: 18-27°C, alta umidade do ar\n\
                 • Suporte: Fornecer tutor ou vara de musgo para plantas maiores",
            ),
            entry(
                "Spathiphyllum",
                "Lírio-da-Paz",
                "O Spathiphyllum, conhecido como Lírio-da-Paz, é uma planta herbácea perene da \
                 família Araceae, originária das florestas tropicais da América Central e do Sul. \
                 Destaca-se pelas folhas verde-escuras brilhantes, pela espata branca elegante e \
                 pela eficácia na purificação do ar interior.",
                "• Rega: 2 vezes por semana, solo consistentemente úmido\n\
                 • Luz: Meia sombra a sombra, tolera pouca luz\n\
                 • Solo: Rico em matéria orgânica, bem drenado e levemente ácido\n\
                 • Temperatura: 18-25°C, alta umidade ambiente\n\
                 • Cuidados: Remover flores murchas e folhas amareladas",
            ),
        ])
    }

    /// Exact key match
    fn exact(&self, scientific_name: &str) -> Option<&KnowledgeBaseEntry> {
        self.entries.iter().find(|e| e.key == scientific_name)
    }

    /// Keyword fallback: case-insensitive substring match between the
    /// scientific name and each key, tried in insertion order. Matches when
    /// the full name contains the key, or the key contains the name's first
    /// token.
    fn keyword(&self, scientific_name: &str) -> Option<&KnowledgeBaseEntry> {
        let name_lower = scientific_name.to_lowercase();
        let first_token = name_lower.split_whitespace().next()?;
        self.entries.iter().find(|e| {
            let key_lower = e.key.to_lowercase();
            name_lower.contains(&key_lower) || key_lower.contains(first_token)
        })
    }
}

/// Resolves curated care/description data for a scientific name
///
/// Resolution order, first match wins: exact key match, keyword fallback,
/// synthesized generic entry from the genus token.
#[derive(Debug, Clone)]
pub struct EnrichmentResolver {
    knowledge_base: KnowledgeBase,
    /// Simulated lookup latency so loading UI stays meaningful; the value is
    /// not a contract
    latency: Duration,
}

impl Default for EnrichmentResolver {
    fn default() -> Self {
        Self {
            knowledge_base: KnowledgeBase::builtin(),
            latency: Duration::from_millis(1000),
        }
    }
}

impl EnrichmentResolver {
    /// Resolver over an injected knowledge base
    pub fn new(knowledge_base: KnowledgeBase) -> Self {
        Self {
            knowledge_base,
            latency: Duration::from_millis(1000),
        }
    }

    /// Override the simulated latency (tests set zero)
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Resolve enrichment for a scientific name; never fails outward
    pub async fn resolve(&self, scientific_name: &str) -> EnrichedInfo {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(entry) = self.knowledge_base.exact(scientific_name) {
            tracing::debug!(key = %entry.key, "Enrichment resolved via exact match");
            return EnrichedInfo {
                common_name: entry.common_name.clone(),
                enhanced_description: entry.enhanced_description.clone(),
                care_instructions: entry.care_instructions.clone(),
            };
        }

        if let Some(entry) = self.knowledge_base.keyword(scientific_name) {
            tracing::debug!(key = %entry.key, "Enrichment resolved via keyword fallback");
            return EnrichedInfo {
                common_name: entry.common_name.clone(),
                enhanced_description: entry.enhanced_description.clone(),
                care_instructions: entry.care_instructions.clone(),
            };
        }

        // Synthesize a generic entry from the genus token. A name with no
        // first token has nothing to synthesize from.
        match scientific_name.split_whitespace().next() {
            Some(genus) => {
                tracing::debug!(genus = %genus, "Enrichment synthesized from genus token");
                EnrichedInfo {
                    common_name: format!("Planta do gênero {}", genus),
                    enhanced_description: format!(
                        "Esta é uma espécie do gênero {}, uma planta com características \
                         únicas. Recomenda-se pesquisar mais sobre suas propriedades \
                         específicas.",
                        genus
                    ),
                    care_instructions: "• Rega: Manter solo levemente úmido\n\
                                        • Luz: Luz indireta brilhante\n\
                                        • Solo: Bem drenado\n\
                                        • Temperatura: Entre 18-25°C"
                        .to_string(),
                }
            }
            None => EnrichedInfo::unavailable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> EnrichmentResolver {
        EnrichmentResolver::default().with_latency(Duration::ZERO)
    }

    #[tokio::test]
    async fn exact_key_returns_entry_verbatim() {
        let info = resolver().resolve("Aloe vera").await;
        assert_eq!(info.common_name, "Babosa");
        assert!(info.enhanced_description.contains("suculenta"));
        assert!(info.care_instructions.contains("Rega"));
    }

    #[tokio::test]
    async fn keyword_fallback_on_first_token() {
        // "Rosa gallica" is not a key, but its first token matches "Rosa"
        let info = resolver().resolve("Rosa gallica").await;
        assert_eq!(info.common_name, "Rosa");
        assert!(!info.care_instructions.is_empty());
    }

    #[tokio::test]
    async fn keyword_fallback_when_name_contains_key() {
        let info = resolver().resolve("Ficus benjamina").await;
        assert_eq!(info.common_name, "Ficus");
    }

    #[tokio::test]
    async fn unknown_name_synthesizes_from_genus() {
        let info = resolver().resolve("Tillandsia usneoides").await;
        assert_eq!(info.common_name, "Planta do gênero Tillandsia");
        assert!(info.enhanced_description.contains("Tillandsia"));
        assert!(!info.care_instructions.is_empty());
    }

    #[tokio::test]
    async fn empty_name_resolves_to_unavailable_triple() {
        let info = resolver().resolve("").await;
        assert_eq!(info, EnrichedInfo::unavailable());
    }

    #[tokio::test]
    async fn injected_entries_respect_insertion_order() {
        let make = |key: &str, common: &str| KnowledgeBaseEntry {
            key: key.to_string(),
            common_name: common.to_string(),
            enhanced_description: String::new(),
            care_instructions: String::new(),
        };
        // Both keys contain the first token "fic"; the first entry wins
        let kb = KnowledgeBase::new(vec![make("Ficaria", "Primeira"), make("Ficus", "Segunda")]);
        let resolver = EnrichmentResolver::new(kb).with_latency(Duration::ZERO);

        let info = resolver.resolve("Fic sp.").await;
        assert_eq!(info.common_name, "Primeira");
    }
}
