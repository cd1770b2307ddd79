//! Products, variants, images, stored files and categories.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use threadline_core::models::{Category, Image, Product, Variant};
use threadline_core::{CategoryId, ImageId, ProductId, VariantId};
use tracing::{debug, instrument};

use crate::cache::{CATEGORIES_KEY, CacheValue, product_key};
use crate::client::BackendClient;
use crate::error::BackendError;
use crate::requests::{
    CategoryName, FileUpload, NewImage, NewProduct, NewVariant, PaginatedProducts,
    ProductCategoryLink, ProductFilter, ProductUpdate, UploadedFile, VariantUpdate,
};

impl BackendClient {
    // =========================================================================
    // Product Methods
    // =========================================================================

    /// One page of products matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, filter))]
    pub async fn list_products(
        &self,
        page: u32,
        page_size: u32,
        filter: &ProductFilter,
    ) -> Result<PaginatedProducts, BackendError> {
        let request = self
            .request(Method::GET, &["products"])?
            .query(&[("pageNumber", page), ("pageSize", page_size)])
            .query(filter);
        self.send_json(request).await
    }

    /// Get a product by id. Cached.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, BackendError> {
        let cache_key = product_key(id.as_str());

        if let Some(CacheValue::Product(product)) = self.cache().get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        self.fetch_product(id).await
    }

    /// Get a product by id straight from the backend, refreshing the cache.
    ///
    /// For reads where stock must be current: the product page and adding
    /// to the cart. Other processes change stock without touching this
    /// client's cache.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn fetch_product(&self, id: &ProductId) -> Result<Product, BackendError> {
        let request = self.request(Method::GET, &["products", id.as_str()])?;
        let product: Product = self.send_json(request).await?;

        self.cache()
            .insert(
                product_key(id.as_str()),
                CacheValue::Product(Box::new(product.clone())),
            )
            .await;

        Ok(product)
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the product.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, BackendError> {
        let request = self.request(Method::POST, &["products"])?.json(product);
        self.send_json(request).await
    }

    /// Replace a product's details and category assignments.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, update), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> Result<(), BackendError> {
        let request = self
            .request(Method::PUT, &["products", id.as_str()])?
            .json(update);
        self.send_empty(request).await?;
        self.cache().invalidate(&product_key(id.as_str())).await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), BackendError> {
        let request = self.request(Method::DELETE, &["products", id.as_str()])?;
        self.send_empty(request).await?;
        self.cache().invalidate(&product_key(id.as_str())).await;
        Ok(())
    }

    // =========================================================================
    // Variant Methods
    // =========================================================================

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if the variant does not exist.
    #[instrument(skip(self), fields(variant_id = %id))]
    pub async fn get_variant(&self, id: &VariantId) -> Result<Variant, BackendError> {
        let request = self.request(Method::GET, &["variants", id.as_str()])?;
        self.send_json(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the variant.
    #[instrument(skip(self, variant), fields(product_id = %variant.product_id))]
    pub async fn create_variant(&self, variant: &NewVariant) -> Result<Variant, BackendError> {
        let request = self.request(Method::POST, &["variants"])?.json(variant);
        let created = self.send_json(request).await?;
        self.cache()
            .invalidate(&product_key(variant.product_id.as_str()))
            .await;
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, update), fields(variant_id = %update.variant_id))]
    pub async fn update_variant(&self, update: &VariantUpdate) -> Result<(), BackendError> {
        let request = self
            .request(Method::PUT, &["variants", update.variant_id.as_str()])?
            .json(update);
        self.send_empty(request).await?;
        self.cache()
            .invalidate(&product_key(update.product_id.as_str()))
            .await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(variant_id = %id))]
    pub async fn delete_variant(&self, id: &VariantId) -> Result<(), BackendError> {
        let request = self.request(Method::DELETE, &["variants", id.as_str()])?;
        self.send_empty(request).await?;
        // The owning product is unknown here.
        self.cache().invalidate_all();
        Ok(())
    }

    // =========================================================================
    // Image Methods
    // =========================================================================

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if the image does not exist.
    #[instrument(skip(self), fields(image_id = %id))]
    pub async fn get_image(&self, id: &ImageId) -> Result<Image, BackendError> {
        let request = self.request(Method::GET, &["images", id.as_str()])?;
        self.send_json(request).await
    }

    /// Attach an already-stored file to a variant.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, image), fields(variant_id = %image.variant_id))]
    pub async fn create_image(&self, image: &NewImage) -> Result<Image, BackendError> {
        let request = self.request(Method::POST, &["images"])?.json(image);
        let created = self.send_json(request).await?;
        self.cache().invalidate_all();
        Ok(created)
    }

    /// Store each file and attach it to the variant as a non-default image.
    ///
    /// Files are processed one at a time; the first failure aborts the rest
    /// and earlier uploads are kept.
    ///
    /// # Errors
    ///
    /// Returns the first upload or attach error.
    #[instrument(skip(self, files), fields(variant_id = %variant_id, count = files.len()))]
    pub async fn upload_images(
        &self,
        variant_id: &VariantId,
        files: Vec<FileUpload>,
    ) -> Result<Vec<Image>, BackendError> {
        let mut images = Vec::with_capacity(files.len());
        for file in files {
            let stored = self.upload_file(file).await?;
            let image = self
                .create_image(&NewImage {
                    variant_id: variant_id.clone(),
                    image_url: stored.file_url,
                    is_default: false,
                })
                .await?;
            images.push(image);
        }
        Ok(images)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(image_id = %id))]
    pub async fn delete_image(&self, id: &ImageId) -> Result<(), BackendError> {
        let request = self.request(Method::DELETE, &["images", id.as_str()])?;
        self.send_empty(request).await?;
        self.cache().invalidate_all();
        Ok(())
    }

    /// Delete several image records in one call.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn delete_images(&self, ids: &[ImageId]) -> Result<(), BackendError> {
        let request = self
            .request(Method::DELETE, &["images", "bulk"])?
            .json(ids);
        self.send_empty(request).await?;
        self.cache().invalidate_all();
        Ok(())
    }

    /// Make `image_id` the variant's only default image.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(variant_id = %variant_id, image_id = %image_id))]
    pub async fn set_default_image(
        &self,
        variant_id: &VariantId,
        image_id: &ImageId,
    ) -> Result<(), BackendError> {
        let request = self.request(
            Method::PUT,
            &["images", variant_id.as_str(), "set-default", image_id.as_str()],
        )?;
        self.send_empty(request).await?;
        self.cache().invalidate_all();
        Ok(())
    }

    // =========================================================================
    // File Storage
    // =========================================================================

    /// Store a file in object storage and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type is malformed or the upload fails.
    #[instrument(skip(self, file), fields(file_name = %file.file_name, bytes = file.bytes.len()))]
    pub async fn upload_file(&self, file: FileUpload) -> Result<UploadedFile, BackendError> {
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)?;
        let request = self
            .request(Method::POST, &["s3", "upload"])?
            .multipart(Form::new().part("file", part));
        self.send_json(request).await
    }

    /// Remove a stored file by its public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_file(&self, url: &str) -> Result<(), BackendError> {
        let request = self
            .request(Method::DELETE, &["s3"])?
            .json(&serde_json::json!({ "url": url }));
        self.send_empty(request).await
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// All categories. Cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, BackendError> {
        if let Some(CacheValue::Categories(categories)) = self.cache().get(CATEGORIES_KEY).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let request = self.request(Method::GET, &["categories"])?;
        let categories: Vec<Category> = self.send_json(request).await?;

        self.cache()
            .insert(
                CATEGORIES_KEY.to_string(),
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if the category does not exist.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn get_category(&self, id: &CategoryId) -> Result<Category, BackendError> {
        let request = self.request(Method::GET, &["categories", id.as_str()])?;
        self.send_json(request).await
    }

    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if no category has this name.
    #[instrument(skip(self))]
    pub async fn get_category_by_name(&self, name: &str) -> Result<Category, BackendError> {
        let request = self
            .request(Method::GET, &["categories", "query"])?
            .query(&[("name", name)]);
        self.send_json(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the name.
    #[instrument(skip(self))]
    pub async fn create_category(&self, name: &str) -> Result<Category, BackendError> {
        let request = self
            .request(Method::POST, &["categories"])?
            .json(&CategoryName { name });
        let category = self.send_json(request).await?;
        self.cache().invalidate(CATEGORIES_KEY).await;
        Ok(category)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn update_category(&self, id: &CategoryId, name: &str) -> Result<(), BackendError> {
        let request = self
            .request(Method::PUT, &["categories", id.as_str()])?
            .json(&CategoryName { name });
        self.send_empty(request).await?;
        self.cache().invalidate(CATEGORIES_KEY).await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: &CategoryId) -> Result<(), BackendError> {
        let request = self.request(Method::DELETE, &["categories", id.as_str()])?;
        self.send_empty(request).await?;
        self.cache().invalidate(CATEGORIES_KEY).await;
        Ok(())
    }

    /// Assign a product to a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(category_id = %category_id, product_id = %product_id))]
    pub async fn link_product_category(
        &self,
        category_id: &CategoryId,
        product_id: &ProductId,
    ) -> Result<(), BackendError> {
        let request = self
            .request(Method::POST, &["categories", "product"])?
            .json(&ProductCategoryLink {
                category_id,
                product_id,
            });
        self.send_empty(request).await?;
        self.cache().invalidate(&product_key(product_id.as_str())).await;
        Ok(())
    }
}
