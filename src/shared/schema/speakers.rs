diesel::table! {
    speakers (id) {
        id -> Int4,
        name -> Text,
        email -> Text,
        phone -> Nullable<Text>,
        bio -> Nullable<Text>,
        topics -> Array<Text>,
        fee_min -> Nullable<Numeric>,
        fee_max -> Nullable<Numeric>,
        travels_from -> Nullable<Text>,
        website -> Nullable<Text>,
        active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    vendors (id) {
        id -> Int4,
        company_name -> Text,
        contact_name -> Nullable<Text>,
        email -> Nullable<Text>,
        phone -> Nullable<Text>,
        service_category -> Nullable<Text>,
        notes -> Nullable<Text>,
        active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
