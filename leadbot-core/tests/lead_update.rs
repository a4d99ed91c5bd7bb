use leadbot_core::{Intent, Nlu, VALID_STATUSES};

#[test]
fn nlu_lead_update() {
    let nlu = Nlu::new().unwrap();
    let parsed = nlu.parse("Update lead 7b1b8f54-aaaa-bbbb-cccc-1234567890ab to WON notes: booked unit A2");
    assert_eq!(parsed.intent, Intent::LeadUpdate);
    assert_eq!(parsed.entities["lead_id"], "7b1b8f54-aaaa-bbbb-cccc-1234567890ab");
    assert_eq!(parsed.entities["status"], "WON");
    assert_eq!(parsed.entities["notes"], "booked unit A2");
}

#[test]
fn nlu_lead_update_different_status() {
    let nlu = Nlu::new().unwrap();
    let parsed = nlu.parse("Mark lead abc-123-def-456 status IN PROGRESS");
    assert_eq!(parsed.intent, Intent::LeadUpdate);
    assert_eq!(parsed.entities["lead_id"], "abc-123-def-456");
    assert_eq!(parsed.entities["status"], "IN_PROGRESS");
}

#[test]
fn nlu_lead_update_status_always_canonical() {
    let nlu = Nlu::new().unwrap();
    for (phrase, expected) in [
        ("Mark lead abc-123 status follow up", "FOLLOW_UP"),
        ("Update lead abc-123 to lost", "LOST"),
        ("Mark lead abc-123 as new", "NEW"),
    ] {
        let parsed = nlu.parse(phrase);
        assert_eq!(parsed.intent, Intent::LeadUpdate, "{phrase}");
        assert_eq!(parsed.entities["status"], expected, "{phrase}");
        assert!(VALID_STATUSES.contains(&parsed.entities["status"].as_str()));
    }
}

#[test]
fn nlu_lead_update_without_status_is_unknown() {
    let nlu = Nlu::new().unwrap();
    let parsed = nlu.parse("Update lead without proper status");
    assert_eq!(parsed.intent, Intent::Unknown);
    assert!(parsed.entities.is_empty());
}
