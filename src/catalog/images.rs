//! Folder-based image selection for venues and suppliers.
//!
//! Each category owns exactly one folder under the images root. Lookups only
//! ever return files from that folder, repeating them in order when more
//! images are requested than the folder holds.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// URL prefix the images root is served under
pub const IMAGES_URL_PREFIX: &str = "/static/images";

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "svg"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image category: {0}")]
    InvalidCategory(String),
    #[error("food_type is required for the food category")]
    MissingFoodType,
    #[error("invalid food type: {0} (expected Milk, Meat or Neutral)")]
    InvalidFoodType(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FoodType {
    Milk,
    Meat,
    Neutral,
}

impl FoodType {
    pub const ALL: [FoodType; 3] = [FoodType::Milk, FoodType::Meat, FoodType::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Milk => "Milk",
            Self::Meat => "Meat",
            Self::Neutral => "Neutral",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ImageError> {
        match s.to_lowercase().as_str() {
            "milk" | "dairy" => Ok(Self::Milk),
            "meat" => Ok(Self::Meat),
            "neutral" => Ok(Self::Neutral),
            _ => Err(ImageError::InvalidFoodType(s.to_string())),
        }
    }

    /// Catering subtype as stored on suppliers (e.g. `Meat_Chef`) to food folder
    pub fn from_catering_subtype(subtype: Option<&str>) -> Self {
        match subtype {
            Some(s) if s.starts_with("Meat") => Self::Meat,
            Some(s) if s.starts_with("Dairy") => Self::Milk,
            _ => Self::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ImageCategory {
    Hall,
    Pool,
    Wedding,
    Design,
    Dj,
    Orchestra,
    Photographers,
    Government,
    Food(FoodType),
}

impl ImageCategory {
    pub fn all() -> Vec<ImageCategory> {
        let mut all = vec![
            Self::Hall,
            Self::Pool,
            Self::Wedding,
            Self::Design,
            Self::Dj,
            Self::Orchestra,
            Self::Photographers,
            Self::Government,
        ];
        all.extend(FoodType::ALL.iter().map(|f| Self::Food(*f)));
        all
    }

    /// Folder relative to the images root
    pub fn folder(&self) -> String {
        match self {
            Self::Hall => "hall".to_string(),
            Self::Pool => "pool".to_string(),
            Self::Wedding => "wedding".to_string(),
            Self::Design => "design".to_string(),
            Self::Dj => "dj".to_string(),
            Self::Orchestra => "orchestra".to_string(),
            Self::Photographers => "photographers".to_string(),
            Self::Government => "מדינתיים".to_string(),
            Self::Food(food) => format!("food/{}", food.as_str()),
        }
    }

    /// Key used in the manifest
    pub fn key(&self) -> String {
        match self {
            Self::Food(food) => format!("food_{}", food.as_str()),
            Self::Government => "government".to_string(),
            _ => self.folder(),
        }
    }

    pub fn parse(category: &str, food_type: Option<&str>) -> Result<Self, ImageError> {
        match category.to_lowercase().as_str() {
            "hall" => Ok(Self::Hall),
            "pool" => Ok(Self::Pool),
            "wedding" => Ok(Self::Wedding),
            "design" => Ok(Self::Design),
            "dj" => Ok(Self::Dj),
            "orchestra" => Ok(Self::Orchestra),
            "photographers" => Ok(Self::Photographers),
            "government" | "מדינתיים" => Ok(Self::Government),
            "food" => {
                let food_type = food_type.ok_or(ImageError::MissingFoodType)?;
                Ok(Self::Food(FoodType::parse(food_type)?))
            }
            _ => Err(ImageError::InvalidCategory(category.to_string())),
        }
    }

    /// Venue style (e.g. `Villa_Pool`, `Garden`) to image category
    pub fn for_venue_style(style: &str) -> Self {
        let style = style.to_lowercase();
        if style.contains("pool") || style.contains("villa") {
            Self::Pool
        } else if style.contains("wedding") || style.contains("garden") {
            Self::Wedding
        } else {
            Self::Hall
        }
    }

    /// Supplier type to image category; `None` for types without a folder
    pub fn for_supplier(supplier_type: &str, subtype: Option<&str>) -> Option<Self> {
        match supplier_type {
            "Catering" => Some(Self::Food(FoodType::from_catering_subtype(subtype))),
            "DJ" => Some(Self::Dj),
            "Orchestra" => Some(Self::Orchestra),
            "Photographer" => Some(Self::Photographers),
            "Designer" => Some(Self::Design),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImageManifest {
    pub images: BTreeMap<String, Vec<String>>,
    pub total_images: usize,
}

/// Pre-scanned listing of every category folder
#[derive(Debug, Clone, Default)]
pub struct ImageLibrary {
    folders: BTreeMap<ImageCategory, Vec<String>>,
}

impl ImageLibrary {
    /// Scan every category folder under `root`. Missing folders yield empty listings.
    pub fn scan(root: &Path) -> Self {
        let mut folders = BTreeMap::new();
        for category in ImageCategory::all() {
            let images = list_folder(root, &category.folder());
            debug!(category = %category.key(), count = images.len(), "Scanned image folder");
            folders.insert(category, images);
        }

        let library = Self { folders };
        info!(
            root = %root.display(),
            total = library.total(),
            "Image library loaded"
        );
        library
    }

    /// `count` images from the category folder, cycling when the folder is smaller.
    pub fn images(&self, category: ImageCategory, count: usize) -> Vec<String> {
        let available = self.folder(category);
        if available.is_empty() {
            return Vec::new();
        }
        (0..count)
            .map(|i| available[i % available.len()].clone())
            .collect()
    }

    /// Same as [`images`](Self::images) but for a category given by name.
    /// Unknown names produce an empty result.
    pub fn images_by_name(&self, category: &str, food_type: Option<&str>, count: usize) -> Vec<String> {
        match ImageCategory::parse(category, food_type) {
            Ok(category) => self.images(category, count),
            Err(e) => {
                warn!(error = %e, "Image lookup for unknown category");
                Vec::new()
            }
        }
    }

    /// The `index`-th image of a category, wrapping around
    pub fn image_at(&self, category: ImageCategory, index: usize) -> Option<String> {
        let available = self.folder(category);
        if available.is_empty() {
            None
        } else {
            Some(available[index % available.len()].clone())
        }
    }

    pub fn total(&self) -> usize {
        self.folders.values().map(Vec::len).sum()
    }

    pub fn manifest(&self) -> ImageManifest {
        ImageManifest {
            images: self
                .folders
                .iter()
                .map(|(category, images)| (category.key(), images.clone()))
                .collect(),
            total_images: self.total(),
        }
    }

    fn folder(&self, category: ImageCategory) -> &[String] {
        self.folders
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn list_folder(root: &Path, folder: &str) -> Vec<String> {
    let entries = match std::fs::read_dir(root.join(folder)) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| has_allowed_extension(name))
        .collect();
    names.sort();

    names
        .into_iter()
        .map(|name| format!("{}/{}/{}", IMAGES_URL_PREFIX, folder, name))
        .collect()
}

fn has_allowed_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
