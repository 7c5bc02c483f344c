mod category;
mod chapter;
mod course;
mod pensum_topic;
mod purchase;
mod user_progress;

use sqlx_migrator::vec_box;

pub struct Migration;

sqlx_migrator::sqlite_migration!(
    Migration,
    "pensum",
    "m0001",
    vec_box![],
    vec_box![
        category::CreateTable,
        category::CreateUk1,
        course::CreateTable,
        course::CreateIdx1,
        course::CreateIdx2,
        pensum_topic::CreateTable,
        pensum_topic::CreateIdx1,
        chapter::CreateTable,
        chapter::CreateIdx1,
        chapter::CreateIdx2,
        user_progress::CreateTable,
        user_progress::CreateUk1,
        purchase::CreateTable,
        purchase::CreateUk1
    ]
);
