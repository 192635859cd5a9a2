use oracle_lens::narrative::{SignalGain, sanitize_narrative};
use oracle_lens::record::SENTINEL;

const GAINS: [SignalGain; 3] = [SignalGain::Quiet, SignalGain::Balanced, SignalGain::Amplified];

fn long_text(len: usize) -> String {
    let word = "pressure ";
    word.repeat(len / word.len() + 1).chars().take(len).collect()
}

#[test]
fn empty_input_is_sentinel_for_every_gain() {
    for gain in GAINS {
        assert_eq!(sanitize_narrative(None, gain), SENTINEL);
        assert_eq!(sanitize_narrative(Some(""), gain), SENTINEL);
        assert_eq!(sanitize_narrative(Some("   \n\t "), gain), SENTINEL);
    }
}

#[test]
fn output_never_exceeds_cap() {
    for gain in GAINS {
        for len in [10, 139, 140, 141, 239, 240, 241, 359, 360, 361, 900] {
            let out = sanitize_narrative(Some(&long_text(len)), gain);
            assert!(
                out.chars().count() <= gain.cap(),
                "{gain:?} len {len} gave {}",
                out.chars().count()
            );
        }
    }
}

#[test]
fn cut_text_ends_with_ellipsis() {
    let out = sanitize_narrative(Some(&long_text(500)), SignalGain::Balanced);
    assert!(out.ends_with('…'));
    let out = sanitize_narrative(Some(&long_text(500)), SignalGain::Amplified);
    assert!(out.ends_with('…'));
    assert!(out.chars().count() <= 360);
    let short = sanitize_narrative(Some("Short and sweet"), SignalGain::Balanced);
    assert_eq!(short, "Short and sweet");
}

#[test]
fn quiet_stops_at_first_sentence() {
    let mut text = "a".repeat(49);
    text.push_str(". ");
    text.push_str(&long_text(249));
    assert_eq!(text.chars().count(), 300);

    let out = sanitize_narrative(Some(&text), SignalGain::Quiet);
    assert!(out.chars().count() <= 51);
    assert!(out.ends_with('…'));
    assert_eq!(out.trim_end_matches('…'), format!("{}.", "a".repeat(49)));

    let single = sanitize_narrative(Some("Story held."), SignalGain::Quiet);
    assert_eq!(single, "Story held.");
}

#[test]
fn quiet_without_boundary_still_caps() {
    let out = sanitize_narrative(Some(&long_text(300)), SignalGain::Quiet);
    assert_eq!(out.chars().count(), 140);
    assert!(out.ends_with('…') || out.chars().count() < 140);
}

#[test]
fn phrasing_is_genericized_and_annotations_stripped() {
    let raw = "The Oracle sees a C-lean: pass rush (n=14) travels well against a shaky league-wide similar line.   Expect pressure early.";
    let out = sanitize_narrative(Some(raw), SignalGain::Amplified);
    assert_eq!(
        out,
        "The model sees a leans win: pass rush travels well against a shaky similar games line. Expect pressure early."
    );
    assert!(!out.contains("(n="));
}

#[test]
fn identical_input_is_deterministic() {
    let text = long_text(700);
    for gain in GAINS {
        assert_eq!(
            sanitize_narrative(Some(&text), gain),
            sanitize_narrative(Some(&text), gain)
        );
    }
}

#[test]
fn multibyte_text_is_cut_on_char_boundaries() {
    let text = "é".repeat(400);
    let out = sanitize_narrative(Some(&text), SignalGain::Quiet);
    assert_eq!(out.chars().count(), 140);
}

#[test]
fn gain_levels_and_cycle() {
    assert_eq!(SignalGain::default(), SignalGain::Balanced);
    assert_eq!(SignalGain::Quiet.level(), 0);
    assert_eq!(SignalGain::from_level(2), Some(SignalGain::Amplified));
    assert_eq!(SignalGain::from_level(3), None);
    assert_eq!(SignalGain::parse(" QUIET "), Some(SignalGain::Quiet));
    assert_eq!(SignalGain::parse("2"), Some(SignalGain::Amplified));
    assert_eq!(SignalGain::parse("7"), None);
    assert_eq!(SignalGain::Amplified.next(), SignalGain::Quiet);
}
