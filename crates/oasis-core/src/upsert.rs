//! Two-phase cabin save with a compensating rollback.
//!
//! A cabin save writes a record and, when a new image was picked, uploads
//! the image under a freshly generated name. The record is written first
//! with the image's *eventual* public URL, then the image is uploaded.
//!
//! ```text
//! validate ──► phase 1: create/update record ──► phase 2: upload image ──► done
//!                  │ err                              │ err
//!                  ▼                                  ▼
//!            StoreError (nothing             compensate: delete record
//!            committed)                      ──► RollbackError
//! ```
//!
//! The compensation deletes the record in both create and edit mode. The
//! cabins namespace of the session cache is invalidated once phase 1 has
//! committed, whether or not the save as a whole succeeds.

use oasis_store::{StoreBackend, StoreError, record_id};
use oasis_types::{Bucket, Cabin, CabinId, Collection};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::cache::SessionCache;
use crate::error::{Compensation, CoreError, RollbackError, ValidationError, decode};
use crate::fields::{self, Field};

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Image bytes picked in the form, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// File name as picked by the user.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
    /// MIME type sent with the upload.
    pub content_type: String,
}

/// Where a cabin's image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// An already stored image, referenced by its public URL.
    Stored(String),
    /// A new image to upload.
    Pending(ImageUpload),
}

/// A cabin as submitted from the form.
///
/// Numeric fields are optional so that the field rule table can apply its
/// defaults and minimums.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CabinDraft {
    /// Present when editing an existing cabin.
    pub id: Option<CabinId>,
    /// Cabin name.
    pub name: String,
    /// Maximum guests.
    pub max_capacity: Option<u32>,
    /// Nightly rate before discount.
    pub regular_price: Option<Decimal>,
    /// Nightly discount. Defaults to zero.
    pub discount: Option<Decimal>,
    /// Free-text description.
    pub description: String,
    /// New or existing image. Required when creating.
    pub image: Option<ImageSource>,
}

/// Whether the save inserts or updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertMode {
    /// Insert a new cabin.
    Create,
    /// Update the cabin with this id.
    Edit(CabinId),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CabinPayload {
    name: String,
    max_capacity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    regular_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    discount: Decimal,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A validated, ready-to-run cabin save.
///
/// Built with [`CabinUpsert::plan`], run with [`CabinUpsert::execute`].
/// Planning makes no store calls, so a rejected draft never touches the
/// store.
#[derive(Debug, Clone)]
pub struct CabinUpsert {
    mode: UpsertMode,
    payload: CabinPayload,
    upload: Option<(String, ImageUpload)>,
}

impl CabinUpsert {
    /// Validate `draft` and derive the record payload and asset name.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::NonPositive`] or [`ValidationError::BelowMinimum`]
    ///   for capacity or price fields outside the field rule table.
    /// - [`ValidationError::DiscountExceedsPrice`] if the discount is larger
    ///   than the regular price.
    /// - [`ValidationError::MissingImage`] when creating without an image.
    /// - [`ValidationError::InvalidImageName`] if the picked file name is
    ///   empty once sanitized.
    pub fn plan(draft: CabinDraft, store: &StoreBackend) -> Result<Self, ValidationError> {
        let max_capacity = fields::resolve_count(Field::MaxCapacity, draft.max_capacity)?;
        let regular_price = fields::resolve(Field::RegularPrice, draft.regular_price)?;
        let discount = fields::resolve(Field::Discount, draft.discount)?;
        if discount > regular_price {
            return Err(ValidationError::DiscountExceedsPrice {
                regular_price,
                discount,
            });
        }

        let mode = draft.id.map_or(UpsertMode::Create, UpsertMode::Edit);

        let (image, upload) = match draft.image {
            Some(ImageSource::Stored(url)) => (Some(url), None),
            Some(ImageSource::Pending(file)) => {
                let token = Uuid::new_v4().simple().to_string();
                let name = asset_name(&token, &file.file_name)?;
                let url = store.public_url(Bucket::CabinImages, &name);
                (Some(url), Some((name, file)))
            }
            None if mode == UpsertMode::Create => return Err(ValidationError::MissingImage),
            None => (None, None),
        };

        Ok(Self {
            mode,
            payload: CabinPayload {
                name: draft.name,
                max_capacity,
                regular_price,
                discount,
                description: draft.description,
                image,
            },
            upload,
        })
    }

    /// Insert or update.
    pub const fn mode(&self) -> UpsertMode {
        self.mode
    }

    /// Name the new image will be stored under, if one is uploaded.
    pub fn asset_name(&self) -> Option<&str> {
        self.upload.as_ref().map(|(name, _)| name.as_str())
    }

    /// Image URL written into the record, if the image changes.
    pub fn image_url(&self) -> Option<&str> {
        self.payload.image.as_deref()
    }

    /// Run the save.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Store`] if the record write fails; nothing was
    ///   committed and nothing is compensated.
    /// - [`CoreError::Rollback`] if the upload fails after the record write
    ///   committed; the record has been deleted (or the delete attempt is
    ///   recorded in the error).
    pub async fn execute(
        self,
        store: &StoreBackend,
        cache: &SessionCache,
    ) -> Result<Cabin, CoreError> {
        let record = self.write_record(store).await?;
        let outcome = self.finish(store, record).await;
        cache.invalidate_kind(Collection::Cabins).await;
        outcome
    }

    async fn write_record(&self, store: &StoreBackend) -> Result<serde_json::Value, CoreError> {
        let payload = serde_json::to_value(&self.payload).map_err(StoreError::from)?;
        let record = match self.mode {
            UpsertMode::Create => store.create_record(Collection::Cabins, &payload).await?,
            UpsertMode::Edit(id) => {
                store
                    .update_record(Collection::Cabins, id.into_inner(), &payload)
                    .await?
            }
        };
        tracing::debug!(mode = ?self.mode, "cabin record written");
        Ok(record)
    }

    async fn finish(
        &self,
        store: &StoreBackend,
        record: serde_json::Value,
    ) -> Result<Cabin, CoreError> {
        let id = match self.mode {
            UpsertMode::Edit(id) => id.into_inner(),
            UpsertMode::Create => record_id(&record)?,
        };

        if let Some((name, file)) = &self.upload {
            if let Err(cause) = store
                .upload_blob(Bucket::CabinImages, name, &file.bytes, &file.content_type)
                .await
            {
                let compensation = compensate(store, id).await;
                tracing::warn!(
                    cabin_id = id,
                    asset = %name,
                    error = %cause,
                    %compensation,
                    "cabin image upload failed, record rolled back"
                );
                return Err(RollbackError {
                    cause,
                    compensation,
                }
                .into());
            }
        }

        let cabin: Cabin = decode("cabin", record)?;
        tracing::info!(cabin_id = id, name = %cabin.name, "cabin saved");
        Ok(cabin)
    }
}

async fn compensate(store: &StoreBackend, id: i64) -> Compensation {
    match store.delete_record(Collection::Cabins, id).await {
        Ok(()) => Compensation::Deleted,
        Err(e) => Compensation::Failed(e),
    }
}

/// Build a collision-resistant asset name from a random `token` and the
/// picked file name.
///
/// Path separators are dropped. Any other character outside
/// `[A-Za-z0-9._-]` becomes `_`, so the name survives unchanged as a URL path
/// segment and the stored URL addresses the uploaded object.
///
/// ```
/// use oasis_core::upsert::asset_name;
///
/// assert_eq!(asset_name("f00d", "cabin/001.jpg").ok().as_deref(), Some("f00d-cabin001.jpg"));
/// assert_eq!(asset_name("f00d", "cabin #2?.jpg").ok().as_deref(), Some("f00d-cabin__2_.jpg"));
/// ```
///
/// # Errors
///
/// Returns [`ValidationError::InvalidImageName`] if no letter or digit is
/// left of the file name.
pub fn asset_name(token: &str, file_name: &str) -> Result<String, ValidationError> {
    let cleaned: String = file_name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\'))
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidImageName);
    }
    Ok(format!("{token}-{cleaned}"))
}
