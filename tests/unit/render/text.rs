use super::*;

#[test]
fn default_font_shorthand() {
    let f = parse_font(DEFAULT_FONT);
    assert_eq!(f.size_px, 18.0);
    assert_eq!(f.weight, 400);
    assert!(!f.italic);
    assert_eq!(f.families, vec!["system-ui", "-apple-system", "sans-serif"]);
}

#[test]
fn style_and_weight_prefixes() {
    let f = parse_font("italic bold 24px \"Helvetica Neue\", Arial");
    assert_eq!(f.size_px, 24.0);
    assert_eq!(f.weight, 700);
    assert!(f.italic);
    assert_eq!(f.families, vec!["Helvetica Neue", "Arial"]);

    let f = parse_font("600 14px/1.2 serif");
    assert_eq!(f.weight, 600);
    assert_eq!(f.size_px, 14.0);
    assert_eq!(f.families, vec!["serif"]);
}

#[test]
fn garbage_falls_back_to_defaults() {
    assert_eq!(parse_font("huge comic"), FontSpec::default());
    assert_eq!(parse_font(""), FontSpec::default());
    assert_eq!(parse_font("-4px Arial").size_px, 18.0);
}

#[test]
fn align_and_baseline_parsing() {
    assert_eq!(TextAlign::parse("center"), TextAlign::Center);
    assert_eq!(TextAlign::parse("end"), TextAlign::Right);
    assert_eq!(TextAlign::parse("start"), TextAlign::Left);
    assert_eq!(TextBaseline::parse("middle"), TextBaseline::Middle);
    assert_eq!(TextBaseline::parse("hanging"), TextBaseline::Top);
    assert_eq!(TextBaseline::parse("alphabetic"), TextBaseline::Alphabetic);
    assert_eq!(TextBaseline::parse("whatever"), TextBaseline::Top);
    assert_eq!(TextBaseline::default(), TextBaseline::Top);
}

#[test]
fn layout_uses_system_font_when_available() {
    let mut engine = TextEngine::new();
    let Some(text) = engine.layout("Force", &parse_font("20px sans-serif")) else {
        // Hosts without any installed font skip text entirely.
        return;
    };
    assert!(text.width > 0.0);
    assert!(text.height > 0.0);
    let (dx, dy) = text.anchor_offset(TextAlign::Center, TextBaseline::Middle);
    assert_eq!(dx, -text.width / 2.0);
    assert_eq!(dy, -text.height / 2.0);
    let (_, dy) = text.anchor_offset(TextAlign::Left, TextBaseline::Alphabetic);
    assert_eq!(dy, -text.baseline);
}

#[test]
fn layout_style_carries_weight_and_slant() {
    let (weight, style) = parley_font_style(&parse_font("italic bold 20px system-ui"));
    assert_eq!(weight, parley::style::FontWeight::new(700.0));
    assert_eq!(style, parley::style::FontStyle::Italic);

    let (weight, style) = parley_font_style(&parse_font("300 12px serif"));
    assert_eq!(weight, parley::style::FontWeight::new(300.0));
    assert_eq!(style, parley::style::FontStyle::Normal);

    let mut engine = TextEngine::new();
    if let Some(text) = engine.layout("F = ma", &parse_font("bold 28px serif")) {
        assert!(text.width > 0.0);
    }
}
