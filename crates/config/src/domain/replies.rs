//! Reply Templates
//!
//! Portuguese copy sent back to the lead outside the question bank:
//! handoff confirmations per SLA tier, reason-specific handoff replies,
//! the triage summary header and the conflict confirmation prompt.
//! Placeholders use `{name}`, `{contact}`, `{field}`, `{previous}` and
//! `{new}` and are filled by the render helpers.

use lead_triage_core::HandoffReason;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyTemplates {
    /// Hot lead, agent assigned, immediate contact promised
    #[serde(default = "default_hot_handoff")]
    pub hot_handoff: String,
    /// Appended to the hot reply when agent contact exposure is enabled
    #[serde(default = "default_hot_contact_suffix")]
    pub hot_contact_suffix: String,
    /// Warm lead, agent assigned, contact promised shortly
    #[serde(default = "default_warm_handoff")]
    pub warm_handoff: String,
    /// Cold lead still worth an agent pass
    #[serde(default = "default_cold_handoff")]
    pub cold_handoff: String,
    /// Cold lead parked in the nurture track
    #[serde(default = "default_cold_nurture")]
    pub cold_nurture: String,
    /// No agent could take the lead
    #[serde(default = "default_no_agent")]
    pub no_agent_available: String,
    #[serde(default = "default_summary_header")]
    pub summary_header: String,
    /// Summary closing line when an agent is named
    #[serde(default = "default_final_named")]
    pub handoff_final_named: String,
    /// Summary closing line without a named agent
    #[serde(default = "default_final_generic")]
    pub handoff_final_generic: String,
    #[serde(default = "default_handoff_human")]
    pub handoff_human: String,
    #[serde(default = "default_handoff_negotiation")]
    pub handoff_negotiation: String,
    #[serde(default = "default_handoff_visit")]
    pub handoff_visit: String,
    #[serde(default = "default_handoff_complaint")]
    pub handoff_complaint: String,
    #[serde(default = "default_handoff_legal")]
    pub handoff_legal: String,
    #[serde(default = "default_handoff_fallback")]
    pub handoff_fallback: String,
    /// Asked when a confirmed field receives a contradicting value
    #[serde(default = "default_conflict_prompt")]
    pub conflict_prompt: String,
}

impl Default for ReplyTemplates {
    fn default() -> Self {
        Self {
            hot_handoff: default_hot_handoff(),
            hot_contact_suffix: default_hot_contact_suffix(),
            warm_handoff: default_warm_handoff(),
            cold_handoff: default_cold_handoff(),
            cold_nurture: default_cold_nurture(),
            no_agent_available: default_no_agent(),
            summary_header: default_summary_header(),
            handoff_final_named: default_final_named(),
            handoff_final_generic: default_final_generic(),
            handoff_human: default_handoff_human(),
            handoff_negotiation: default_handoff_negotiation(),
            handoff_visit: default_handoff_visit(),
            handoff_complaint: default_handoff_complaint(),
            handoff_legal: default_handoff_legal(),
            handoff_fallback: default_handoff_fallback(),
            conflict_prompt: default_conflict_prompt(),
        }
    }
}

fn default_hot_handoff() -> String {
    "Perfeito! Já acionei {name} agora e você deve receber contato em instantes.".to_string()
}

fn default_hot_contact_suffix() -> String {
    " Se preferir adiantar: {contact}.".to_string()
}

fn default_warm_handoff() -> String {
    "Entendi seu perfil! Vou repassar para {name}, que entra em contato em breve com opções."
        .to_string()
}

fn default_cold_handoff() -> String {
    "Anotei suas preferências. Um corretor vai avaliar as opções e te retornar.".to_string()
}

fn default_cold_nurture() -> String {
    "Anotei suas preferências. Vou te mantendo informado sobre imóveis que encaixem no seu perfil."
        .to_string()
}

fn default_no_agent() -> String {
    "Anotei tudo! Nossa equipe vai te retornar em breve.".to_string()
}

fn default_summary_header() -> String {
    "Resumo da triagem:".to_string()
}

fn default_final_named() -> String {
    "Perfeito, obrigado! Vou repassar essas informações para o(a) corretor(a) {name}, que vai entrar em contato por aqui para te enviar opções dentro do seu perfil.".to_string()
}

fn default_final_generic() -> String {
    "Perfeito, obrigado! Vou repassar essas informações para um corretor, que vai entrar em contato por aqui para te enviar opções dentro do seu perfil.".to_string()
}

fn default_handoff_human() -> String {
    "Tudo bem, vou te passar para um corretor agora.".to_string()
}

fn default_handoff_negotiation() -> String {
    "Vou acionar um corretor para tratar do valor e te responder rapidinho.".to_string()
}

fn default_handoff_visit() -> String {
    "Vou chamar um corretor para agendar a visita. Qual horário funciona melhor?".to_string()
}

fn default_handoff_complaint() -> String {
    "Sinto muito pela experiência. Vou passar para um corretor resolver agora.".to_string()
}

fn default_handoff_legal() -> String {
    "Posso pedir para um corretor te ajudar com essa parte contratual. Pode ser?".to_string()
}

fn default_handoff_fallback() -> String {
    "Vou acionar um corretor humano para te ajudar melhor.".to_string()
}

fn default_conflict_prompt() -> String {
    "Só para confirmar {field}: antes você tinha dito {previous}, mas agora entendi {new}. Qual vale?".to_string()
}

impl ReplyTemplates {
    pub fn handoff_reason_reply(&self, reason: HandoffReason) -> &str {
        match reason {
            HandoffReason::HumanRequested => &self.handoff_human,
            HandoffReason::Negotiation => &self.handoff_negotiation,
            HandoffReason::VisitRequest => &self.handoff_visit,
            HandoffReason::Complaint => &self.handoff_complaint,
            HandoffReason::Legal => &self.handoff_legal,
        }
    }

    pub fn render_hot(&self, agent_name: &str, contact: Option<&str>) -> String {
        let mut reply = self.hot_handoff.replace("{name}", agent_name);
        if let Some(contact) = contact {
            reply.push_str(&self.hot_contact_suffix.replace("{contact}", contact));
        }
        reply
    }

    pub fn render_warm(&self, agent_name: &str) -> String {
        self.warm_handoff.replace("{name}", agent_name)
    }

    pub fn render_final(&self, agent_name: Option<&str>) -> String {
        match agent_name {
            Some(name) => self.handoff_final_named.replace("{name}", name),
            None => self.handoff_final_generic.clone(),
        }
    }

    pub fn render_conflict(&self, field_label: &str, previous: &str, new: &str) -> String {
        self.conflict_prompt
            .replace("{field}", field_label)
            .replace("{previous}", previous)
            .replace("{new}", new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hot_reply_includes_contact_only_when_present() {
        let replies = ReplyTemplates::default();
        let with = replies.render_hot("Ana Costa", Some("(83) 99999-0001"));
        assert!(with.contains("Ana Costa"));
        assert!(with.contains("(83) 99999-0001"));
        let without = replies.render_hot("Ana Costa", None);
        assert!(without.contains("Ana Costa"));
        assert!(!without.contains("{contact}"));
        assert!(!without.contains("(83)"));
    }

    #[test]
    fn reason_replies_cover_all_reasons() {
        let replies = ReplyTemplates::default();
        for reason in [
            HandoffReason::HumanRequested,
            HandoffReason::Negotiation,
            HandoffReason::VisitRequest,
            HandoffReason::Complaint,
            HandoffReason::Legal,
        ] {
            assert!(!replies.handoff_reason_reply(reason).is_empty());
        }
    }

    #[test]
    fn conflict_prompt_fills_all_placeholders() {
        let replies = ReplyTemplates::default();
        let prompt = replies.render_conflict("orçamento", "R$ 1.2 milhões", "R$ 600.000");
        assert!(prompt.contains("orçamento"));
        assert!(prompt.contains("R$ 1.2 milhões"));
        assert!(prompt.contains("R$ 600.000"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn final_line_falls_back_to_generic() {
        let replies = ReplyTemplates::default();
        assert!(replies.render_final(Some("Bruno")).contains("Bruno"));
        assert!(replies.render_final(None).contains("um corretor"));
    }

    #[test]
    fn templates_deserialize_with_overrides() {
        let yaml = r#"
hot_handoff: "Chamando {name}!"
"#;
        let replies: ReplyTemplates = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(replies.render_hot("Lia", None), "Chamando Lia!");
        assert_eq!(replies.summary_header, "Resumo da triagem:");
    }
}
