use chrono::{DateTime, Utc};
use diesel::prelude::*;
use lombok::AllArgsConstructor;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::database::schema::auth_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AuthToken {
    pub key: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, AllArgsConstructor, Debug)]
#[diesel(table_name = crate::database::schema::auth_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAuthToken {
    pub key: String,
    pub user_id: i64,
}
