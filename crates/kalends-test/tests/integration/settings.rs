use kalends_core::config::Settings;
use kalends_rfc::rfc::ical::core::{ComponentKind, Property};
use kalends_rfc::rfc::ical::{Calendar, Component};

#[test_log::test]
fn defaults_need_no_configuration() -> anyhow::Result<()> {
    let settings = Settings::default();
    settings.validate()?;

    let calendar = Calendar::with_settings(&settings);
    assert_eq!(calendar.version(), Some("2.0"));
    assert_eq!(calendar.prodid(), Some(settings.calendar.prodid.as_str()));
    Ok(())
}

#[test_log::test]
fn settings_control_stamping_and_folding() -> anyhow::Result<()> {
    let mut settings = Settings::default();
    settings.calendar.prodid = "-//Acme//Planner 2.1//EN".to_string();
    settings.serializer.fold_width = 30;
    settings.validate()?;

    let mut calendar = Calendar::with_settings(&settings);
    let mut event = Component::new_displayable(ComponentKind::Event)?;
    event.add_property(Property::text("DESCRIPTION", "x".repeat(100)));
    calendar.add_component(event);

    let text = calendar.to_text();
    assert!(text.contains("PRODID:-//Acme//Planner 2.1//EN\r\n"));
    assert!(text.split("\r\n").all(|line| line.len() <= 30));
    Ok(())
}

#[test_log::test]
fn invalid_settings_are_rejected() {
    let mut settings = Settings::default();
    settings.serializer.fold_width = 1;
    assert!(settings.validate().is_err());
}
