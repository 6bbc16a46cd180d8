//! Body metrics and profile context for the assistant prompt

/// Health fields of a user profile relevant to chat answers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthProfile {
    pub age: Option<i32>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub chronic: Option<String>,
}

/// Body mass index bands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi >= 32.5 {
            BmiCategory::Obese
        } else if bmi >= 25.0 {
            BmiCategory::Overweight
        } else if bmi < 18.5 {
            BmiCategory::Underweight
        } else {
            BmiCategory::Normal
        }
    }

    /// Sentence added to the prompt; a normal BMI adds nothing
    pub fn remark(self) -> Option<&'static str> {
        match self {
            BmiCategory::Obese => Some("Kullanıcının obezite durumu var. "),
            BmiCategory::Overweight => Some("Kullanıcı fazla kilolu. "),
            BmiCategory::Underweight => Some("Kullanıcı zayıf. "),
            BmiCategory::Normal => None,
        }
    }
}

impl HealthProfile {
    /// BMI from height in centimetres and weight in kilograms
    pub fn bmi(&self) -> Option<f64> {
        let height = self.height_cm.filter(|h| *h > 0.0)?;
        let weight = self.weight_kg.filter(|w| *w > 0.0)?;
        let height_m = height / 100.0;
        Some(weight / (height_m * height_m))
    }

    pub fn bmi_category(&self) -> Option<BmiCategory> {
        self.bmi().map(BmiCategory::from_bmi)
    }

    /// Free-text profile summary for the chat prompt (empty when nothing is known)
    pub fn context(&self) -> String {
        let mut context = String::new();

        if let Some(remark) = self.bmi_category().and_then(BmiCategory::remark) {
            context.push_str(remark);
        }
        if let Some(chronic) = self.chronic.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            context.push_str(&format!("Kullanıcının kronik hastalıkları: {chronic}. "));
        }
        if let Some(age) = self.age.filter(|a| *a != 0) {
            context.push_str(&format!("Kullanıcının yaşı: {age}. "));
        }

        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(height: f64, weight: f64) -> HealthProfile {
        HealthProfile {
            height_cm: Some(height),
            weight_kg: Some(weight),
            ..Default::default()
        }
    }

    #[test]
    fn bmi_uses_height_in_centimetres() {
        let bmi = profile(180.0, 81.0).bmi().unwrap();
        assert!((bmi - 25.0).abs() < 1e-9);
    }

    #[test]
    fn categories_follow_thresholds() {
        assert_eq!(BmiCategory::from_bmi(32.5), BmiCategory::Obese);
        assert_eq!(BmiCategory::from_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(24.9), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(18.4), BmiCategory::Underweight);
    }

    #[test]
    fn missing_or_zero_height_gives_no_bmi() {
        assert_eq!(profile(0.0, 70.0).bmi(), None);
        assert_eq!(HealthProfile::default().bmi(), None);
    }

    #[test]
    fn context_lists_bmi_chronic_then_age() {
        let p = HealthProfile {
            age: Some(54),
            height_cm: Some(170.0),
            weight_kg: Some(100.0),
            chronic: Some("Tip 2 diyabet".to_string()),
        };
        assert_eq!(
            p.context(),
            "Kullanıcının obezite durumu var. \
             Kullanıcının kronik hastalıkları: Tip 2 diyabet. \
             Kullanıcının yaşı: 54. "
        );
    }

    #[test]
    fn normal_profile_without_extras_has_empty_context() {
        assert_eq!(profile(175.0, 70.0).context(), "");
    }
}
