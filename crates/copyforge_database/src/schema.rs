//! Diesel schema for gate persistence.

diesel::table! {
    principals (id) {
        id -> Text,
        tier -> Text,
        window_anchor -> Timestamptz,
        pending_tier -> Nullable<Text>,
        pending_tier_effective_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    usage_counters (principal_id, category) {
        principal_id -> Text,
        category -> Text,
        used -> Int8,
        bonus -> Int8,
    }
}

diesel::joinable!(usage_counters -> principals (principal_id));
diesel::allow_tables_to_appear_in_same_query!(principals, usage_counters);
