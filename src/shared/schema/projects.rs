diesel::table! {
    projects (id) {
        id -> Int4,
        project_name -> Text,
        project_type -> Text,
        event_classification -> Text,
        status -> Text,
        event_date -> Nullable<Date>,
        event_location -> Text,
        attendee_count -> Int4,
        budget -> Numeric,
        billing_contact_name -> Text,
        billing_contact_email -> Text,
        billing_contact_phone -> Text,
        logistics_contact_name -> Text,
        logistics_contact_email -> Text,
        logistics_contact_phone -> Text,
        contract_signed -> Bool,
        invoice_sent -> Bool,
        payment_received -> Bool,
        presentation_ready -> Bool,
        materials_sent -> Bool,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
