use bigdecimal::BigDecimal;
use chrono::Utc;

use bureauserver::deals::conversion::{
    classify_event_format, classify_project_type, project_from_deal, INITIAL_PROJECT_STATUS,
};
use bureauserver::deals::Deal;
use bureauserver::shared::utils::generate_access_token;

fn negotiation_deal() -> Deal {
    let now = Utc::now();
    Deal {
        id: 42,
        client_name: "Priya Raman".to_string(),
        client_email: "priya@summitworks.com".to_string(),
        client_phone: Some("512-555-0107".to_string()),
        company: Some("SummitWorks".to_string()),
        event_title: "SummitWorks Sales Kickoff".to_string(),
        event_date: None,
        event_location: Some("Austin, TX".to_string()),
        event_type: Some("Keynote".to_string()),
        attendee_count: Some(450),
        deal_value: Some(BigDecimal::from(15000)),
        status: "negotiation".to_string(),
        priority: "high".to_string(),
        notes: None,
        firm_offer_id: None,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn winning_a_keynote_deal_yields_a_local_speaking_project() {
    let deal = negotiation_deal();
    let project = project_from_deal(&deal);

    assert_eq!(project.project_name, "SummitWorks Sales Kickoff");
    assert_eq!(project.project_type, "Speaking");
    assert_eq!(project.event_classification, "local");
    assert_eq!(project.budget, BigDecimal::from(15000));
    assert_eq!(project.status, INITIAL_PROJECT_STATUS);
    assert!(!project.contract_signed);
}

#[test]
fn synthesized_projects_start_with_clean_tracking_flags() {
    let project = project_from_deal(&negotiation_deal());
    assert!(!project.contract_signed);
    assert!(!project.invoice_sent);
    assert!(!project.payment_received);
    assert!(!project.presentation_ready);
    assert!(!project.materials_sent);
}

#[test]
fn virtual_detection_spans_both_event_fields() {
    assert_eq!(classify_event_format(Some("Webinar"), None), "virtual");
    assert_eq!(
        classify_event_format(Some("Keynote"), Some("Remote - Zoom")),
        "virtual"
    );
    assert_eq!(
        classify_event_format(Some("Keynote"), Some("Chicago, IL")),
        "local"
    );
}

#[test]
fn project_type_is_an_exact_string_classification() {
    assert_eq!(classify_project_type(Some("Workshop")), "Workshop");
    assert_eq!(classify_project_type(Some("Keynote")), "Speaking");
    assert_eq!(classify_project_type(Some("Consulting")), "Consulting");
    assert_eq!(classify_project_type(Some("Panel")), "Other");
    assert_eq!(classify_project_type(None), "Other");
}

#[test]
fn both_project_contacts_come_from_the_deal_client() {
    let deal = negotiation_deal();
    let project = project_from_deal(&deal);

    assert_eq!(project.billing_contact_name, deal.client_name);
    assert_eq!(project.logistics_contact_name, deal.client_name);
    assert_eq!(project.billing_contact_email, deal.client_email);
    assert_eq!(project.logistics_contact_email, deal.client_email);
}

#[test]
fn capability_tokens_look_opaque() {
    let token = generate_access_token();
    assert_eq!(token.len(), 32);
    assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(token, generate_access_token());
}
