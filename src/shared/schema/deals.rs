diesel::table! {
    deals (id) {
        id -> Int4,
        client_name -> Text,
        client_email -> Text,
        client_phone -> Nullable<Text>,
        company -> Nullable<Text>,
        event_title -> Text,
        event_date -> Nullable<Date>,
        event_location -> Nullable<Text>,
        event_type -> Nullable<Text>,
        attendee_count -> Nullable<Int4>,
        deal_value -> Nullable<Numeric>,
        status -> Text,
        priority -> Text,
        notes -> Nullable<Text>,
        firm_offer_id -> Nullable<Int4>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    deal_events (id) {
        id -> Int4,
        deal_id -> Int4,
        event_type -> Text,
        payload -> Jsonb,
        status -> Text,
        attempts -> Int4,
        last_error -> Nullable<Text>,
        created_at -> Timestamptz,
        processed_at -> Nullable<Timestamptz>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(deals, deal_events);
