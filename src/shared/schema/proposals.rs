diesel::table! {
    proposals (id) {
        id -> Int4,
        deal_id -> Nullable<Int4>,
        client_name -> Text,
        client_email -> Text,
        event_title -> Text,
        event_date -> Nullable<Date>,
        status -> Text,
        access_token -> Text,
        total_amount -> Nullable<Numeric>,
        valid_until -> Nullable<Date>,
        client_viewed_at -> Nullable<Timestamptz>,
        client_responded_at -> Nullable<Timestamptz>,
        client_notes -> Nullable<Text>,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    firm_offers (id) {
        id -> Int4,
        proposal_id -> Int4,
        status -> Text,
        event_overview -> Jsonb,
        speaker_program -> Jsonb,
        financial_details -> Jsonb,
        confirmation -> Jsonb,
        speaker_access_token -> Text,
        speaker_viewed_at -> Nullable<Timestamptz>,
        speaker_confirmed -> Nullable<Bool>,
        speaker_notes -> Nullable<Text>,
        speaker_responded_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(proposals, firm_offers);
