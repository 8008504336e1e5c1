use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "videos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Object-store key (`{uuid}.{ext}`). A key is referenced by at most one row, ever.
    #[sea_orm(column_name = "filename", unique)]
    pub storage_key: String,

    /// Display name, initially the uploaded file's name.
    pub original_filename: String,

    /// URL or path of the object, derived from the key.
    #[sea_orm(column_name = "file_path")]
    pub location: String,

    /// Must equal the stored object's length.
    pub file_size: i64,

    pub content_type: Option<String>,

    pub uploaded_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
