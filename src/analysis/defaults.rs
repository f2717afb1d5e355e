use super::prediction::Tip;

pub const TIP_BATCH: usize = 5;

const RISKY_TIPS: [&str; TIP_BATCH] = [
    "Choose lower-sodium or lower-sugar alternatives.",
    "Avoid processed foods with hidden sodium.",
    "Stay hydrated to help regulate blood pressure.",
    "Pair carbs with protein or fiber to slow absorption.",
    "Monitor portion sizes for better control.",
];

const SAFE_TIPS: [&str; TIP_BATCH] = [
    "Maintain balanced meals across the day.",
    "Stay consistent with meal timing.",
    "Include vegetables for fiber and nutrients.",
    "Keep salt and sugar within daily limits.",
    "Stay hydrated and active regularly.",
];

const DAILY_TIPS: [&str; TIP_BATCH] = [
    "Choose lower-sodium options when possible.",
    "Prefer whole foods and add vegetables to meals.",
    "Watch portion sizes and consider splitting large portions.",
    "Limit added sugars and sugary drinks.",
    "Balance carbs with protein and fiber to slow absorption.",
];

/// Substituted when model output carries a verdict but no tips.
pub fn default_tips(is_risky: bool) -> [Tip; TIP_BATCH] {
    if is_risky {
        RISKY_TIPS.map(Tip::new)
    } else {
        SAFE_TIPS.map(Tip::new)
    }
}

/// Substituted when daily tip generation does not yield a full batch.
pub fn default_daily_tips() -> [Tip; TIP_BATCH] {
    DAILY_TIPS.map(Tip::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_differ_by_verdict() {
        let risky = default_tips(true);
        let safe = default_tips(false);
        assert_eq!(risky.len(), TIP_BATCH);
        assert_eq!(safe.len(), TIP_BATCH);
        assert_ne!(risky, safe);
        assert_eq!(risky[0].content, "Choose lower-sodium or lower-sugar alternatives.");
        assert_eq!(safe[4].content, "Stay hydrated and active regularly.");
    }
}
