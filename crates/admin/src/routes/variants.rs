//! Variant and variant image handlers.
//!
//! Adding a variant is a multipart form so images can be attached in the
//! same step. Images are stored one by one after the variant exists; a
//! failed upload leaves the variant and any earlier images in place.

use axum::{
    Form,
    extract::{Multipart, Path, State, multipart::Field},
    response::Redirect,
};
use serde::Deserialize;
use threadline_backend::{BackendClient, FileUpload, NewVariant, VariantUpdate};
use threadline_core::models::Product;
use threadline_core::{ImageId, Price, ProductId, VariantId};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, set_flash};
use crate::models::Flash;
use crate::state::AppState;

/// Raw variant fields as typed into the form.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct VariantForm {
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub sku: String,
}

/// Variant fields that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantFields {
    pub size: String,
    pub color: String,
    pub price: Price,
    pub stock: i32,
    pub sku: String,
}

impl VariantForm {
    /// Every field is required; price and stock must be non-negative numbers.
    ///
    /// # Errors
    ///
    /// Returns the message to show the admin.
    pub fn validate(&self) -> std::result::Result<VariantFields, &'static str> {
        let size = self.size.trim();
        let color = self.color.trim();
        let sku = self.sku.trim();
        if size.is_empty() || color.is_empty() || sku.is_empty() {
            return Err("All fields are required.");
        }

        let price = self
            .price
            .parse::<Price>()
            .ok()
            .filter(|price| !price.is_negative())
            .ok_or("Price must be a number of zero or more.")?;
        let stock = self
            .stock
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|stock| *stock >= 0)
            .ok_or("Stock must be a whole number of zero or more.")?;

        Ok(VariantFields {
            size: size.to_string(),
            color: color.to_string(),
            price,
            stock,
            sku: sku.to_string(),
        })
    }
}

/// Reject a size and color pair the product already has.
///
/// # Errors
///
/// Returns the message to show the admin.
pub fn check_unique(
    product: &Product,
    fields: &VariantFields,
) -> std::result::Result<(), &'static str> {
    if product.has_variant(&fields.size, &fields.color) {
        Err("This size and color combination already exists.")
    } else {
        Ok(())
    }
}

/// Read one uploaded file, skipping the empty part browsers send when no
/// file was chosen.
async fn read_file(field: Field<'_>) -> Result<Option<FileUpload>> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Could not read upload: {e}")))?;

    if file_name.is_empty() || bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(FileUpload {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    }))
}

/// Split a multipart body into variant fields and attached images.
async fn read_variant_multipart(
    mut multipart: Multipart,
) -> Result<(VariantForm, Vec<FileUpload>)> {
    let mut form = VariantForm::default();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed form: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "images" {
            if let Some(file) = read_file(field).await? {
                files.push(file);
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Malformed form: {e}")))?;
        match name.as_str() {
            "size" => form.size = value,
            "color" => form.color = value,
            "price" => form.price = value,
            "stock" => form.stock = value,
            "sku" => form.sku = value,
            _ => {}
        }
    }

    Ok((form, files))
}

/// Only files in the `images` part, ignoring the rest of the form.
async fn read_image_multipart(mut multipart: Multipart) -> Result<Vec<FileUpload>> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed form: {e}")))?
    {
        if field.name() == Some("images") {
            if let Some(file) = read_file(field).await? {
                files.push(file);
            }
        }
    }
    Ok(files)
}

fn edit_page(product_id: &ProductId) -> Redirect {
    Redirect::to(&format!("/products/{product_id}/edit"))
}

/// Store `files` against the variant and flash the outcome.
async fn attach_images(
    backend: &BackendClient,
    session: &Session,
    variant_id: &VariantId,
    files: Vec<FileUpload>,
) -> bool {
    let count = files.len();
    match backend.upload_images(variant_id, files).await {
        Ok(images) => {
            tracing::info!(variant_id = %variant_id, count = images.len(), "Images uploaded");
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, variant_id = %variant_id, count, "Image upload failed");
            set_flash(
                session,
                Flash::error(format!("Failed to upload one or more images: {}", e.user_message())),
            )
            .await;
            false
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Add a variant to a product, with optional images.
#[instrument(skip(state, admin, session, multipart))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(product_id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Redirect> {
    let (form, files) = read_variant_multipart(multipart).await?;
    let back = edit_page(&product_id);

    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(message) => {
            set_flash(&session, Flash::error(message)).await;
            return Ok(back);
        }
    };

    let backend = state.backend_for(&admin);
    let product = backend.get_product(&product_id).await?;
    if let Err(message) = check_unique(&product, &fields) {
        set_flash(&session, Flash::error(message)).await;
        return Ok(back);
    }

    let new_variant = NewVariant {
        product_id: product_id.clone(),
        size: fields.size,
        color: fields.color,
        price: fields.price,
        stock: fields.stock,
        sku: fields.sku,
    };
    let variant = match backend.create_variant(&new_variant).await {
        Ok(variant) => variant,
        Err(e) => {
            tracing::warn!(error = %e, product_id = %product_id, "Failed to create variant");
            set_flash(&session, Flash::error(e.user_message())).await;
            return Ok(back);
        }
    };
    tracing::info!(variant_id = %variant.variant_id, "Variant created");

    if files.is_empty() || attach_images(&backend, &session, &variant.variant_id, files).await {
        set_flash(&session, Flash::success("Variant added.")).await;
    }
    Ok(back)
}

/// Save a variant's fields. Changing size or color to a pair another
/// variant already uses is rejected.
#[instrument(skip(state, admin, session))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(variant_id): Path<VariantId>,
    Form(form): Form<VariantForm>,
) -> Result<Redirect> {
    let backend = state.backend_for(&admin);
    let variant = backend.get_variant(&variant_id).await?;
    let back = edit_page(&variant.product_id);

    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(message) => {
            set_flash(&session, Flash::error(message)).await;
            return Ok(back);
        }
    };

    if !variant.matches(&fields.size, &fields.color) {
        let product = backend.get_product(&variant.product_id).await?;
        if let Err(message) = check_unique(&product, &fields) {
            set_flash(&session, Flash::error(message)).await;
            return Ok(back);
        }
    }

    let update = VariantUpdate {
        variant_id: variant.variant_id.clone(),
        product_id: variant.product_id.clone(),
        size: fields.size,
        color: fields.color,
        price: fields.price,
        stock: fields.stock,
        sku: fields.sku,
    };
    match backend.update_variant(&update).await {
        Ok(()) => {
            tracing::info!(variant_id = %variant_id, "Variant updated");
            set_flash(&session, Flash::success("Variant updated.")).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, variant_id = %variant_id, "Failed to update variant");
            set_flash(&session, Flash::error(e.user_message())).await;
        }
    }
    Ok(back)
}

#[instrument(skip(state, admin, session))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(variant_id): Path<VariantId>,
) -> Result<Redirect> {
    let backend = state.backend_for(&admin);
    let variant = backend.get_variant(&variant_id).await?;

    match backend.delete_variant(&variant_id).await {
        Ok(()) => {
            tracing::info!(variant_id = %variant_id, "Variant deleted");
            set_flash(&session, Flash::success("Variant deleted.")).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, variant_id = %variant_id, "Failed to delete variant");
            set_flash(&session, Flash::error(e.user_message())).await;
        }
    }
    Ok(edit_page(&variant.product_id))
}

/// Upload more images for an existing variant.
#[instrument(skip(state, admin, session, multipart))]
pub async fn upload_images(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(variant_id): Path<VariantId>,
    multipart: Multipart,
) -> Result<Redirect> {
    let files = read_image_multipart(multipart).await?;
    let backend = state.backend_for(&admin);
    let variant = backend.get_variant(&variant_id).await?;

    if files.is_empty() {
        set_flash(&session, Flash::error("Choose at least one image to upload.")).await;
    } else if attach_images(&backend, &session, &variant_id, files).await {
        set_flash(&session, Flash::success("Images uploaded.")).await;
    }
    Ok(edit_page(&variant.product_id))
}

/// Make one image the variant's default; the backend clears the others.
#[instrument(skip(state, admin, session))]
pub async fn set_default_image(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path((variant_id, image_id)): Path<(VariantId, ImageId)>,
) -> Result<Redirect> {
    let backend = state.backend_for(&admin);
    let variant = backend.get_variant(&variant_id).await?;
    if !variant.images.iter().any(|image| image.image_id == image_id) {
        return Err(AppError::NotFound(format!("image {image_id}")));
    }

    match backend.set_default_image(&variant_id, &image_id).await {
        Ok(()) => set_flash(&session, Flash::success("Default image updated.")).await,
        Err(e) => {
            tracing::warn!(error = %e, image_id = %image_id, "Failed to set default image");
            set_flash(&session, Flash::error(e.user_message())).await;
        }
    }
    Ok(edit_page(&variant.product_id))
}

/// Delete the stored file, then the image record.
#[instrument(skip(state, admin, session))]
pub async fn delete_image(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path((variant_id, image_id)): Path<(VariantId, ImageId)>,
) -> Result<Redirect> {
    let backend = state.backend_for(&admin);
    let variant = backend.get_variant(&variant_id).await?;
    let image = variant
        .images
        .iter()
        .find(|image| image.image_id == image_id)
        .ok_or_else(|| AppError::NotFound(format!("image {image_id}")))?;

    let result = match backend.delete_file(&image.image_url).await {
        Ok(()) => backend.delete_image(&image_id).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => {
            tracing::info!(image_id = %image_id, "Image deleted");
            set_flash(&session, Flash::success("Image deleted.")).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, image_id = %image_id, "Failed to delete image");
            set_flash(&session, Flash::error(e.user_message())).await;
        }
    }
    Ok(edit_page(&variant.product_id))
}
