use leadbot_core::{Intent, Nlu};

#[test]
fn nlu_lead_create() {
    let nlu = Nlu::new().unwrap();
    let parsed =
        nlu.parse("Add a new lead: Rohan Sharma from Gurgaon, phone 9876543210, source Instagram.");
    assert_eq!(parsed.intent, Intent::LeadCreate);
    assert_eq!(parsed.entities["name"], "Rohan Sharma");
    assert_eq!(parsed.entities["phone"], "9876543210");
    assert_eq!(parsed.entities["city"], "Gurgaon");
    assert_eq!(parsed.entities["source"], "Instagram");
}

#[test]
fn nlu_lead_create_without_source() {
    let nlu = Nlu::new().unwrap();
    let parsed = nlu.parse("Create new lead John Smith from Delhi phone 8765432109");
    assert_eq!(parsed.intent, Intent::LeadCreate);
    assert_eq!(parsed.entities["name"], "John Smith");
    assert_eq!(parsed.entities["phone"], "8765432109");
    assert_eq!(parsed.entities["city"], "Delhi");
    assert!(!parsed.entities.contains_key("source"));
}

#[test]
fn nlu_lead_create_country_code_stripped() {
    let nlu = Nlu::new().unwrap();
    let parsed = nlu.parse("Register new lead Priya Verma city Mumbai phone +91 98765-43210");
    assert_eq!(parsed.intent, Intent::LeadCreate);
    assert_eq!(parsed.entities["phone"], "919876543210");
    assert!(parsed.entities["phone"].chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn nlu_lead_create_unlisted_source_dropped() {
    let nlu = Nlu::new().unwrap();
    let parsed = nlu.parse("Create new lead John Smith from Delhi phone 8765432109 via Billboard");
    assert_eq!(parsed.intent, Intent::LeadCreate);
    assert!(!parsed.entities.contains_key("source"));
}

#[test]
fn nlu_lead_create_incomplete_is_unknown() {
    let nlu = Nlu::new().unwrap();
    let parsed = nlu.parse("Add a new lead without proper details");
    assert_eq!(parsed.intent, Intent::Unknown);
    assert!(parsed.entities.is_empty());
}
