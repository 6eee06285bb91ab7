//! Question Bank and Follow-up Nudges
//!
//! Canonical Portuguese question texts for every askable topic, plus the
//! re-engagement nudges sent to idle sessions. Each entry carries one or
//! more phrasing variants; the variant is picked by hashing the session id
//! so a session always sees the same phrasing while phrasing still varies
//! across sessions.

use lead_triage_core::AskTopic;
use serde::{Deserialize, Serialize};

/// Stable variant index for a session/key pair (FNV-1a over both).
pub fn stable_variant_index(session_id: &str, key: &str, count: usize) -> usize {
    if count <= 1 {
        return 0;
    }
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in session_id.bytes().chain(std::iter::once(b'|')).chain(key.bytes()) {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    (hash % count as u64) as usize
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionVariants {
    pub topic: AskTopic,
    pub variants: Vec<String>,
}

/// All askable topics with their phrasing variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    #[serde(default = "default_questions")]
    pub questions: Vec<QuestionVariants>,
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self {
            questions: default_questions(),
        }
    }
}

fn entry(topic: AskTopic, variants: &[&str]) -> QuestionVariants {
    QuestionVariants {
        topic,
        variants: variants.iter().map(|v| (*v).to_string()).collect(),
    }
}

fn default_questions() -> Vec<QuestionVariants> {
    vec![
        entry(
            AskTopic::Intent,
            &[
                "Você quer alugar ou comprar?",
                "Me conta: a ideia é comprar ou alugar?",
            ],
        ),
        entry(
            AskTopic::City,
            &[
                "Qual cidade você prefere? (posso usar João Pessoa como base)",
                "Em qual cidade você está procurando?",
            ],
        ),
        entry(
            AskTopic::CityConfirm,
            &[
                "Confirma João Pessoa ou prefere outra cidade?",
                "Posso seguir com João Pessoa mesmo, ou prefere outra cidade?",
            ],
        ),
        entry(
            AskTopic::Neighborhood,
            &[
                "Quais bairros você quer considerar?",
                "Tem algum bairro de preferência? Pode citar até 3.",
            ],
        ),
        entry(
            AskTopic::MicroLocation,
            &[
                "Prefere beira-mar, 1 quadra ou 2-3 quadras da praia?",
                "Sobre a distância da praia: beira-mar, a 1 quadra ou 2-3 quadras?",
            ],
        ),
        entry(
            AskTopic::PropertyType,
            &[
                "Prefere apartamento, casa, cobertura ou outro tipo?",
                "Que tipo de imóvel você procura: apartamento, casa, cobertura?",
            ],
        ),
        entry(
            AskTopic::Bedrooms,
            &[
                "Quantos quartos você precisa? Quer suíte?",
                "Quantos quartos o imóvel precisa ter?",
            ],
        ),
        entry(
            AskTopic::Suites,
            &["Quantas suítes no mínimo?", "Precisa de suíte? Quantas?"],
        ),
        entry(
            AskTopic::Parking,
            &[
                "Quantas vagas de garagem você precisa (1, 2, 3)?",
                "Precisa de vaga de garagem? Quantas?",
            ],
        ),
        entry(
            AskTopic::Budget,
            &[
                "Qual o orçamento máximo? Pode ser aproximado.",
                "Até quanto você pretende investir? Pode ser uma faixa.",
            ],
        ),
        entry(
            AskTopic::BudgetMin,
            &[
                "Existe um valor mínimo que você quer considerar?",
                "A partir de qual valor você quer ver opções?",
            ],
        ),
        entry(
            AskTopic::Timeline,
            &[
                "Qual o prazo para mudar/fechar? (ex.: imediato, até 6 meses)",
                "Qual prazo você trabalha? Até 30 dias, 3 meses, 6 meses, 12 meses ou flexível?",
            ],
        ),
        entry(
            AskTopic::CondoFeeCap,
            &[
                "Você tem algum teto de condomínio mensal que não pode passar?",
                "Qual o valor máximo de condomínio que funciona pra você?",
            ],
        ),
        entry(
            AskTopic::PaymentMethod,
            &[
                "Como você pretende pagar: financiamento, à vista, FGTS ou misto?",
                "Qual a forma de pagamento: financiamento, à vista ou FGTS?",
            ],
        ),
        entry(
            AskTopic::FloorPreference,
            &[
                "Prefere andar alto, baixo ou tanto faz?",
                "Tem preferência de andar (alto ou baixo)?",
            ],
        ),
        entry(
            AskTopic::LeadName,
            &["Qual seu nome para eu registrar aqui?", "Como posso te chamar?"],
        ),
    ]
}

impl QuestionBank {
    pub fn variants(&self, topic: AskTopic) -> &[String] {
        self.questions
            .iter()
            .find(|q| q.topic == topic)
            .map(|q| q.variants.as_slice())
            .unwrap_or(&[])
    }

    /// Question text for a topic, variant fixed per session.
    pub fn pick(&self, session_id: &str, topic: AskTopic) -> Option<&str> {
        let variants = self.variants(topic);
        if variants.is_empty() {
            return None;
        }
        let idx = stable_variant_index(session_id, topic.as_str(), variants.len());
        variants.get(idx).map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowupNudge {
    pub key: String,
    pub variants: Vec<String>,
}

/// Re-engagement nudges keyed by the gap they chase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowupConfig {
    #[serde(default = "default_nudges")]
    pub nudges: Vec<FollowupNudge>,
}

impl Default for FollowupConfig {
    fn default() -> Self {
        Self {
            nudges: default_nudges(),
        }
    }
}

fn nudge(key: &str, variants: &[&str]) -> FollowupNudge {
    FollowupNudge {
        key: key.to_string(),
        variants: variants.iter().map(|v| (*v).to_string()).collect(),
    }
}

fn default_nudges() -> Vec<FollowupNudge> {
    vec![
        nudge(
            "neighborhood",
            &[
                "Oi! Pra eu não te mandar coisa fora do perfil, me diz: qual bairro você prefere? Pode citar 1-3 opções.",
                "Oi! Ainda tô por aqui. Qual bairro você prefere? Pode citar 1-3 opções.",
            ],
        ),
        nudge(
            "timeline",
            &[
                "Só pra eu alinhar: qual o prazo você trabalha? Até 30 dias, 3 meses, 6 meses, 12 meses ou flexível?",
                "Pra eu calibrar as opções: qual prazo você trabalha? 30 dias, 3 meses, 6 meses, 12 meses ou flexível?",
            ],
        ),
        nudge(
            "condo_fee_cap",
            &[
                "Me diz uma coisa: você tem algum teto de condomínio mensal que não pode passar?",
                "Uma dúvida rápida: existe um teto de condomínio mensal pra você?",
            ],
        ),
        nudge(
            "payment_method",
            &[
                "Como você pretende pagar: financiamento, à vista, FGTS ou misto?",
                "Sobre o pagamento: seria financiamento, à vista, FGTS ou misto?",
            ],
        ),
        nudge(
            "micro_location",
            &[
                "Sobre a distância da praia: você quer beira-mar, a 1 quadra ou 2-3 quadras da praia?",
                "Pra fechar a localização: beira-mar, 1 quadra ou 2-3 quadras da praia?",
            ],
        ),
        nudge(
            "neighborhood_suggest",
            &[
                "Pensando em João Pessoa: Manaíra, Tambaú ou Cabo Branco te interessam? Ou prefere outro bairro?",
                "Em João Pessoa costumo sugerir Manaíra, Tambaú e Cabo Branco. Algum te interessa?",
            ],
        ),
    ]
}

impl FollowupConfig {
    pub fn variants(&self, key: &str) -> &[String] {
        self.nudges
            .iter()
            .find(|n| n.key == key)
            .map(|n| n.variants.as_slice())
            .unwrap_or(&[])
    }

    pub fn pick(&self, session_id: &str, key: &str) -> Option<&str> {
        let variants = self.variants(key);
        if variants.is_empty() {
            return None;
        }
        let idx = stable_variant_index(session_id, key, variants.len());
        variants.get(idx).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_index_is_stable_and_in_range() {
        let a = stable_variant_index("sess-1", "budget", 3);
        let b = stable_variant_index("sess-1", "budget", 3);
        assert_eq!(a, b);
        assert!(a < 3);
        assert_eq!(stable_variant_index("sess-1", "budget", 1), 0);
        assert_eq!(stable_variant_index("sess-1", "budget", 0), 0);
    }

    #[test]
    fn variant_index_differs_by_key() {
        let indices: Vec<usize> = ["intent", "city", "budget", "timeline", "parking"]
            .iter()
            .map(|key| stable_variant_index("sess-42", key, 7))
            .collect();
        let first = indices[0];
        assert!(indices.iter().any(|i| *i != first));
    }

    #[test]
    fn bank_covers_every_askable_topic() {
        let bank = QuestionBank::default();
        for topic in [
            AskTopic::Intent,
            AskTopic::City,
            AskTopic::CityConfirm,
            AskTopic::Neighborhood,
            AskTopic::MicroLocation,
            AskTopic::PropertyType,
            AskTopic::Bedrooms,
            AskTopic::Suites,
            AskTopic::Parking,
            AskTopic::Budget,
            AskTopic::BudgetMin,
            AskTopic::Timeline,
            AskTopic::CondoFeeCap,
            AskTopic::PaymentMethod,
            AskTopic::FloorPreference,
            AskTopic::LeadName,
        ] {
            assert!(
                bank.pick("any-session", topic).is_some(),
                "missing question for {topic:?}"
            );
        }
    }

    #[test]
    fn same_session_gets_same_phrasing() {
        let bank = QuestionBank::default();
        let first = bank.pick("sess-abc", AskTopic::Budget).unwrap();
        let second = bank.pick("sess-abc", AskTopic::Budget).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn followup_nudges_cover_default_keys() {
        let followup = FollowupConfig::default();
        for key in [
            "neighborhood",
            "timeline",
            "condo_fee_cap",
            "payment_method",
            "micro_location",
            "neighborhood_suggest",
        ] {
            assert!(followup.pick("sess-1", key).is_some(), "missing nudge {key}");
        }
        assert!(followup.pick("sess-1", "unknown").is_none());
    }

    #[test]
    fn bank_deserializes_from_yaml() {
        let yaml = r#"
questions:
  - topic: budget
    variants:
      - "Qual o teto?"
"#;
        let bank: QuestionBank = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(bank.pick("s", AskTopic::Budget), Some("Qual o teto?"));
        assert!(bank.pick("s", AskTopic::Intent).is_none());
    }
}
