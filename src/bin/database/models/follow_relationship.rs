use chrono::{DateTime, Utc};
use diesel::prelude::*;
use lombok::AllArgsConstructor;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::database::schema::follow_relationships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FollowRelationship {
    pub id: i64,
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, AllArgsConstructor, Debug)]
#[diesel(table_name = crate::database::schema::follow_relationships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewFollowRelationship {
    pub from_user_id: i64,
    pub to_user_id: i64,
}
