use bigdecimal::BigDecimal;
use chrono::Utc;

use crate::deals::Deal;
use crate::projects::NewProject;

/// Every synthesized project starts in the furthest-out pipeline bucket;
/// the operations team re-buckets by event proximity later.
pub const INITIAL_PROJECT_STATUS: &str = "2plus_months";

const VIRTUAL_MARKERS: [&str; 3] = ["virtual", "webinar", "remote"];

pub fn classify_project_type(event_type: Option<&str>) -> &'static str {
    match event_type.unwrap_or("") {
        "Workshop" => "Workshop",
        "Keynote" => "Speaking",
        "Consulting" => "Consulting",
        _ => "Other",
    }
}

fn mentions_virtual(field: Option<&str>) -> bool {
    field
        .map(|value| {
            let value = value.to_lowercase();
            VIRTUAL_MARKERS.iter().any(|marker| value.contains(marker))
        })
        .unwrap_or(false)
}

pub fn classify_event_format(
    event_type: Option<&str>,
    event_location: Option<&str>,
) -> &'static str {
    if mentions_virtual(event_type) || mentions_virtual(event_location) {
        "virtual"
    } else {
        "local"
    }
}

/// Total mapping from a won deal to a project payload. Every consumed field
/// has a fallback, so synthesis never fails on missing optional data. The
/// deal stage has a single client contact; it seeds both the billing and the
/// logistics contact on the project.
pub fn project_from_deal(deal: &Deal) -> NewProject {
    let now = Utc::now();

    let project_name = if deal.event_title.is_empty() {
        "To be determined".to_string()
    } else {
        deal.event_title.clone()
    };

    NewProject {
        project_name,
        project_type: classify_project_type(deal.event_type.as_deref()).to_string(),
        event_classification: classify_event_format(
            deal.event_type.as_deref(),
            deal.event_location.as_deref(),
        )
        .to_string(),
        status: INITIAL_PROJECT_STATUS.to_string(),
        event_date: deal.event_date,
        event_location: deal
            .event_location
            .clone()
            .unwrap_or_else(|| "To be determined".to_string()),
        attendee_count: deal.attendee_count.unwrap_or(0),
        budget: deal
            .deal_value
            .clone()
            .unwrap_or_else(|| BigDecimal::from(0)),
        billing_contact_name: deal.client_name.clone(),
        billing_contact_email: deal.client_email.clone(),
        billing_contact_phone: deal.client_phone.clone().unwrap_or_default(),
        logistics_contact_name: deal.client_name.clone(),
        logistics_contact_email: deal.client_email.clone(),
        logistics_contact_phone: deal.client_phone.clone().unwrap_or_default(),
        contract_signed: false,
        invoice_sent: false,
        payment_received: false,
        presentation_ready: false,
        materials_sent: false,
        notes: Some(format!("Converted from deal #{}", deal.id)),
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn deal(event_type: Option<&str>, event_location: Option<&str>) -> Deal {
        let now = Utc::now();
        Deal {
            id: 42,
            client_name: "Dana Whitfield".to_string(),
            client_email: "dana@example.com".to_string(),
            client_phone: Some("555-0142".to_string()),
            company: Some("Whitfield Group".to_string()),
            event_title: "Annual Leadership Summit".to_string(),
            event_date: None,
            event_location: event_location.map(str::to_string),
            event_type: event_type.map(str::to_string),
            attendee_count: Some(300),
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
    fn project_type_classification_is_exact_match() {
        assert_eq!(classify_project_type(Some("Workshop")), "Workshop");
        assert_eq!(classify_project_type(Some("Keynote")), "Speaking");
        assert_eq!(classify_project_type(Some("Consulting")), "Consulting");
        assert_eq!(classify_project_type(Some("Fireside Chat")), "Other");
        assert_eq!(classify_project_type(Some("workshop")), "Other");
        assert_eq!(classify_project_type(None), "Other");
    }

    #[test]
    fn event_format_detects_virtual_markers_case_insensitively() {
        assert_eq!(classify_event_format(Some("Webinar"), None), "virtual");
        assert_eq!(
            classify_event_format(None, Some("Remote - Zoom")),
            "virtual"
        );
        assert_eq!(
            classify_event_format(Some("Keynote"), Some("VIRTUAL stage")),
            "virtual"
        );
        assert_eq!(
            classify_event_format(Some("Keynote"), Some("Chicago, IL")),
            "local"
        );
        assert_eq!(classify_event_format(None, None), "local");
    }

    #[test]
    fn keynote_in_austin_maps_to_speaking_local() {
        let deal = deal(Some("Keynote"), Some("Austin, TX"));
        let project = project_from_deal(&deal);

        assert_eq!(project.project_name, "Annual Leadership Summit");
        assert_eq!(project.project_type, "Speaking");
        assert_eq!(project.event_classification, "local");
        assert_eq!(project.status, INITIAL_PROJECT_STATUS);
        assert_eq!(project.budget, BigDecimal::from(15000));
        assert!(!project.contract_signed);
        assert!(!project.invoice_sent);
        assert!(!project.payment_received);
        assert!(!project.presentation_ready);
        assert!(!project.materials_sent);
    }

    #[test]
    fn billing_and_logistics_contacts_share_the_deal_contact() {
        let project = project_from_deal(&deal(Some("Keynote"), Some("Austin, TX")));
        assert_eq!(project.billing_contact_name, project.logistics_contact_name);
        assert_eq!(
            project.billing_contact_email,
            project.logistics_contact_email
        );
        assert_eq!(project.billing_contact_email, "dana@example.com");
        assert_eq!(project.billing_contact_phone, "555-0142");
    }

    #[test]
    fn mapping_is_total_on_a_sparse_deal() {
        let now = Utc::now();
        let sparse = Deal {
            id: 7,
            client_name: String::new(),
            client_email: String::new(),
            client_phone: None,
            company: None,
            event_title: String::new(),
            event_date: None,
            event_location: None,
            event_type: None,
            attendee_count: None,
            deal_value: None,
            status: "won".to_string(),
            priority: "low".to_string(),
            notes: None,
            firm_offer_id: None,
            created_at: now,
            updated_at: now,
        };

        let project = project_from_deal(&sparse);
        assert_eq!(project.project_name, "To be determined");
        assert_eq!(project.event_location, "To be determined");
        assert_eq!(project.attendee_count, 0);
        assert_eq!(project.budget, BigDecimal::from(0));
        assert_eq!(project.project_type, "Other");
        assert_eq!(project.event_classification, "local");
        assert_eq!(project.notes.as_deref(), Some("Converted from deal #7"));
    }
}
