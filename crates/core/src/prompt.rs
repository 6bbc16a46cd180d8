//! Prompt templates for the generative-language assistant

use serde::{Deserialize, Serialize};

use crate::lab::LabFinding;

/// How many conversation lines are replayed to the model
pub const HISTORY_WINDOW: usize = 10;

/// Maximum number of report characters embedded in the analysis prompt
pub const REPORT_EXCERPT_CHARS: usize = 3000;

/// Opening line of every lab report reply
pub const REPORT_HEADER: &str = "Genel değerlendirme yapılıyor...";

/// Who said a line in the assistant conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

impl Speaker {
    fn label(self) -> &'static str {
        match self {
            Speaker::User => "User",
            Speaker::Bot => "Bot",
        }
    }
}

/// One line of an assistant conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatLine {
    pub sender: Speaker,
    pub text: String,
}

impl ChatLine {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Speaker::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Speaker::Bot,
            text: text.into(),
        }
    }
}

/// Inputs of a single chat turn
#[derive(Debug, Clone)]
pub struct ChatPrompt<'a> {
    /// Conversation so far, including the message being answered
    pub history: &'a [ChatLine],
    /// Output of `HealthProfile::context`
    pub profile_context: &'a str,
    pub message: &'a str,
}

impl ChatPrompt<'_> {
    fn history_text(&self) -> String {
        let start = self.history.len().saturating_sub(HISTORY_WINDOW);
        self.history[start..]
            .iter()
            .map(|line| format!("{}: {}\n", line.sender.label(), line.text))
            .collect()
    }

    pub fn render(&self) -> String {
        let history = self.history_text();
        let history = if history.is_empty() {
            "Yok.".to_string()
        } else {
            history
        };
        let profile = if self.profile_context.is_empty() {
            "Özel bilgi yok."
        } else {
            self.profile_context
        };

        format!(
            r#"
Sen bir genel sağlık asistanısın. Kullanıcıya güvenli ve evde uygulanabilir tavsiyeler ver.
Sadece beslenme, yaşam tarzı ve basit çözümler öner. İlaç önerme.
Cevap verirken nazik, anlaşılır ve destekleyici ol. Gerektiğinde örnekler ver.
Cevaplarını **okunabilir şekilde başlık ve maddeler kullanarak ver**, uzun tek paragraflar oluşturma.
Her adımı numaralandır veya maddele, gerekli yerlerde yeni satıra başlat.

Konuşma geçmişi:
{history}

Kullanıcı profili: {profile}
Kullanıcının mesajı: {message}

Yanıtın kısa ve öz (2-3 cümle) olmalı.
Cevap Sonunda, cevabı destekliyecek ekstra bir öneride bulunmak için sor ve kullanıcı onaylarsa yap.
Cevaplarını gerekli yerlerde madde madde yap.
Cevaplarını gerekli yerlerde yeni satıra başlat.
Gerektiğinde kullanıcıya motivasyon verici ve pozitif ifadeler kullan.
Her cevabın sonunda, kullanıcının kendine dikkat etmesi için basit bir hatırlatma ekle (örn. "Bol su içmeyi unutmayın.").
"#,
            message = self.message,
        )
    }
}

/// Prompt asking the model to review an uploaded lab report
pub fn report_prompt(report_text: &str) -> String {
    let excerpt: String = report_text.chars().take(REPORT_EXCERPT_CHARS).collect();
    format!(
        r#"
Sen bir sağlık asistanısın. Kullanıcının tahlil raporunu inceledin.
Görevlerin:
1. Genel durumu 1-2 cümle ile özetle.
2. Referans dışı değerleri listele (eğer varsa).
3. Her referans dışı değer için kısa ve basit öneriler ver.
4. Referans dışı değer yoksa böyle devam etmesi için önerilerde bulun.
Rapor metni:
{excerpt}
"#
    )
}

/// Final reply for a lab report upload
pub fn compose_report_reply(findings: &[LabFinding], ai_reply: &str) -> String {
    let mut reply = REPORT_HEADER.to_string();

    if findings.is_empty() {
        reply.push_str("\n Önemli değerler referans aralıklarında.");
    } else {
        let items: Vec<String> = findings.iter().map(ToString::to_string).collect();
        reply.push_str("\n\n Referans dışı değerler bulundu:\n- ");
        reply.push_str(&items.join("\n- "));
    }

    reply.push_str("\n\nAI Önerisi:\n");
    reply.push_str(ai_reply);
    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lab;

    #[test]
    fn empty_history_and_profile_use_placeholders() {
        let prompt = ChatPrompt {
            history: &[],
            profile_context: "",
            message: "Uykusuzluk için ne yapabilirim?",
        }
        .render();

        assert!(prompt.contains("Konuşma geçmişi:\nYok.\n"));
        assert!(prompt.contains("Kullanıcı profili: Özel bilgi yok.\n"));
        assert!(prompt.contains("Kullanıcının mesajı: Uykusuzluk için ne yapabilirim?\n"));
    }

    #[test]
    fn history_keeps_only_the_last_ten_lines() {
        let history: Vec<ChatLine> = (0..12)
            .map(|i| {
                if i % 2 == 0 {
                    ChatLine::user(format!("soru {i}"))
                } else {
                    ChatLine::bot(format!("cevap {i}"))
                }
            })
            .collect();

        let prompt = ChatPrompt {
            history: &history,
            profile_context: "Kullanıcının yaşı: 30. ",
            message: "soru 10",
        }
        .render();

        assert!(!prompt.contains("User: soru 0\n"));
        assert!(!prompt.contains("Bot: cevap 1\n"));
        assert!(prompt.contains("User: soru 2\n"));
        assert!(prompt.contains("Bot: cevap 11\n"));
        assert!(prompt.contains("Kullanıcı profili: Kullanıcının yaşı: 30. \n"));
    }

    #[test]
    fn report_prompt_truncates_by_characters() {
        let text = "ж".repeat(REPORT_EXCERPT_CHARS + 50);
        let prompt = report_prompt(&text);
        assert_eq!(prompt.matches('ж').count(), REPORT_EXCERPT_CHARS);
    }

    #[test]
    fn reply_lists_findings_before_ai_advice() {
        let findings = lab::analyze("Hemoglobin: 10 g/dL (Ref: 12-16)");
        let reply = compose_report_reply(&findings, "Demir yönünden zengin beslenin.");
        assert_eq!(
            reply,
            "Genel değerlendirme yapılıyor...\n\n Referans dışı değerler bulundu:\n\
             - Hemoglobin düşük (10.0 g/dL, ref: 12-16)\n\nAI Önerisi:\nDemir yönünden zengin beslenin."
        );
    }

    #[test]
    fn reply_without_findings_reports_normal_values() {
        let reply = compose_report_reply(&[], "Böyle devam edin.");
        assert!(reply.starts_with("Genel değerlendirme yapılıyor...\n Önemli değerler referans aralıklarında."));
        assert!(reply.ends_with("AI Önerisi:\nBöyle devam edin."));
    }

    #[test]
    fn chat_lines_serialize_with_lowercase_sender() {
        let json = serde_json::to_value(ChatLine::bot("Merhaba")).unwrap();
        assert_eq!(json, serde_json::json!({"sender": "bot", "text": "Merhaba"}));
    }
}
