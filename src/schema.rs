// Column names follow the desktop application's camelCase layout;
// `sql_name` maps them to snake_case Rust names.

diesel::table! {
    candidates (id) {
        id -> Integer,
        name -> Text,
        #[sql_name = "passportNo"]
        passport_no -> Nullable<Text>,
        phone -> Nullable<Text>,
        status -> Text,
        #[sql_name = "createdAt"]
        created_at -> Text,
        #[sql_name = "isDeleted"]
        is_deleted -> Integer,
        #[sql_name = "deletedBatchId"]
        deleted_batch_id -> Nullable<Text>,
        #[sql_name = "deletedAt"]
        deleted_at -> Nullable<Text>,
    }
}

diesel::table! {
    employers (id) {
        id -> Integer,
        #[sql_name = "companyName"]
        company_name -> Text,
        country -> Nullable<Text>,
        #[sql_name = "contactEmail"]
        contact_email -> Nullable<Text>,
        #[sql_name = "createdAt"]
        created_at -> Text,
        #[sql_name = "isDeleted"]
        is_deleted -> Integer,
        #[sql_name = "deletedBatchId"]
        deleted_batch_id -> Nullable<Text>,
        #[sql_name = "deletedAt"]
        deleted_at -> Nullable<Text>,
    }
}

diesel::table! {
    job_orders (id) {
        id -> Integer,
        #[sql_name = "employerId"]
        employer_id -> Integer,
        #[sql_name = "positionTitle"]
        position_title -> Text,
        #[sql_name = "openingsCount"]
        openings_count -> Integer,
        status -> Text,
        #[sql_name = "createdAt"]
        created_at -> Text,
        #[sql_name = "isDeleted"]
        is_deleted -> Integer,
        #[sql_name = "deletedBatchId"]
        deleted_batch_id -> Nullable<Text>,
        #[sql_name = "deletedAt"]
        deleted_at -> Nullable<Text>,
    }
}

diesel::table! {
    placements (id) {
        id -> Integer,
        #[sql_name = "candidateId"]
        candidate_id -> Integer,
        #[sql_name = "jobOrderId"]
        job_order_id -> Integer,
        status -> Text,
        #[sql_name = "createdAt"]
        created_at -> Text,
        #[sql_name = "isDeleted"]
        is_deleted -> Integer,
        #[sql_name = "deletedBatchId"]
        deleted_batch_id -> Nullable<Text>,
        #[sql_name = "deletedAt"]
        deleted_at -> Nullable<Text>,
    }
}

diesel::table! {
    documents (id) {
        id -> Integer,
        #[sql_name = "candidateId"]
        candidate_id -> Integer,
        #[sql_name = "fileName"]
        file_name -> Text,
        #[sql_name = "filePath"]
        file_path -> Text,
        category -> Text,
        #[sql_name = "createdAt"]
        created_at -> Text,
        #[sql_name = "isDeleted"]
        is_deleted -> Integer,
        #[sql_name = "deletedBatchId"]
        deleted_batch_id -> Nullable<Text>,
        #[sql_name = "deletedAt"]
        deleted_at -> Nullable<Text>,
    }
}

diesel::table! {
    payments (id) {
        id -> Integer,
        #[sql_name = "candidateId"]
        candidate_id -> Integer,
        amount -> Double,
        description -> Text,
        #[sql_name = "createdAt"]
        created_at -> Text,
        #[sql_name = "isDeleted"]
        is_deleted -> Integer,
        #[sql_name = "deletedBatchId"]
        deleted_batch_id -> Nullable<Text>,
        #[sql_name = "deletedAt"]
        deleted_at -> Nullable<Text>,
    }
}

// The five tracking tables share one layout.
macro_rules! tracking_table {
    ($name:ident) => {
        diesel::table! {
            $name (id) {
                id -> Integer,
                #[sql_name = "candidateId"]
                candidate_id -> Integer,
                status -> Text,
                notes -> Nullable<Text>,
                #[sql_name = "createdAt"]
                created_at -> Text,
                #[sql_name = "isDeleted"]
                is_deleted -> Integer,
                #[sql_name = "deletedBatchId"]
                deleted_batch_id -> Nullable<Text>,
                #[sql_name = "deletedAt"]
                deleted_at -> Nullable<Text>,
            }
        }
    };
}

tracking_table!(visa_tracking);
tracking_table!(passport_tracking);
tracking_table!(medical_tracking);
tracking_table!(interview_tracking);
tracking_table!(travel_tracking);

diesel::table! {
    users (id) {
        id -> Integer,
        username -> Text,
        role -> Text,
        #[sql_name = "createdAt"]
        created_at -> Text,
    }
}

diesel::table! {
    audit_log (id) {
        id -> Integer,
        #[sql_name = "userId"]
        user_id -> Nullable<Integer>,
        username -> Text,
        action -> Text,
        #[sql_name = "targetType"]
        target_type -> Text,
        #[sql_name = "targetId"]
        target_id -> Integer,
        details -> Nullable<Text>,
        #[sql_name = "createdAt"]
        created_at -> Text,
    }
}

diesel::joinable!(job_orders -> employers (employer_id));
diesel::joinable!(placements -> candidates (candidate_id));
diesel::joinable!(documents -> candidates (candidate_id));
diesel::joinable!(payments -> candidates (candidate_id));

diesel::allow_tables_to_appear_in_same_query!(
    audit_log,
    candidates,
    documents,
    employers,
    interview_tracking,
    job_orders,
    medical_tracking,
    passport_tracking,
    payments,
    placements,
    travel_tracking,
    users,
    visa_tracking,
);
