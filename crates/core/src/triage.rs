//! Emergency keyword detection for chat messages

/// Notice prepended to the assistant reply when a message mentions an emergency
pub const EMERGENCY_NOTICE: &str =
    "⚠️ Bu ciddi bir durum olabilir. Lütfen 112'yi arayın veya en yakın acile gidin.\n\n";

/// Phrases that indicate a potentially life-threatening situation
pub const DANGER_WORDS: &[&str] = &[
    "göğüs ağrısı",
    "çarpıntı",
    "nefes darlığı",
    "bayılma",
    "hipotansiyon",
    "kalp krizi",
    "kalp durması",
    "nabız düşüklüğü",
    "nabız yükselmesi",
    "felç",
    "baş dönmesi",
    "nöbet",
    "astım krizi",
    "şiddetli karın ağrısı",
    "kusma",
    "kan kusmak",
    "şiddetli kanama",
    "intihar",
    "kendime zarar",
    "zehirlen",
    "allergik şok",
    "anafilaksi",
    "kırık",
    "yanık",
    "boğulma",
    "düşme",
    "şok",
    "bilinç kaybı",
    "kırıldı",
    "yanığı",
    "boğuldu",
    "düştü",
    "şoku",
    "bilinci kapandı",
];

/// Lowercase with Turkish dotted/dotless I rules (`I` → `ı`, `İ` → `i`)
pub fn turkish_lowercase(text: &str) -> String {
    text.chars()
        .flat_map(|c| match c {
            'I' => vec!['ı'],
            'İ' => vec!['i'],
            other => other.to_lowercase().collect(),
        })
        .collect()
}

/// Lowercase and merge `ı` into `i`, so `KRIZI`, `KRİZİ` and `krizi` compare equal
fn fold_case(text: &str) -> String {
    turkish_lowercase(text).replace('ı', "i")
}

/// True when the message mentions any danger phrase, ignoring case
pub fn is_dangerous(message: &str) -> bool {
    let folded = fold_case(message);
    DANGER_WORDS
        .iter()
        .any(|word| folded.contains(fold_case(word).as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_danger_phrase_inside_sentence() {
        assert!(is_dangerous("Sabahtan beri göğüs ağrısı çekiyorum"));
        assert!(is_dangerous("Dün merdivenden düştü, bileği şişti"));
    }

    #[test]
    fn matching_is_case_insensitive_with_turkish_i() {
        assert!(is_dangerous("GÖĞÜS AĞRISI var"));
        assert!(is_dangerous("NEFES DARLIĞI"));
    }

    #[test]
    fn ascii_capital_i_still_matches_dotted_phrases() {
        assert!(is_dangerous("Intihar etmek istiyorum"));
        assert!(is_dangerous("KALP KRIZI geciriyorum"));
        assert!(is_dangerous("KALP KRİZİ geçiriyorum"));
    }

    #[test]
    fn ordinary_questions_are_not_flagged() {
        assert!(!is_dangerous("Daha sağlıklı beslenmek için ne önerirsin?"));
        assert!(!is_dangerous(""));
    }

    #[test]
    fn turkish_lowercase_maps_dotted_and_dotless_i() {
        assert_eq!(turkish_lowercase("IŞIK İLAÇ"), "ışık ilaç");
    }
}
