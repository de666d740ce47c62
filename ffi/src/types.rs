//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`,
//! and tagged enums with explicit discriminants. Arrays handed to C are
//! boxed slices so the free functions can rebuild them from pointer and
//! length alone. Conversion functions live here to keep `lib.rs` focused on
//! the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use drinks_core::error::ApiError;
use drinks_core::http::HttpMethod;
use drinks_core::types::{Drink, DrinkCategory};

/// Opaque handle to a `DrinkClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiDrinkClient {
    pub(crate) inner: drinks_core::DrinkClient,
}

// ---------------------------------------------------------------------------
// Allocation helpers
// ---------------------------------------------------------------------------

/// Heap-allocate `s` as a C string. Interior NULs are dropped rather than
/// truncating the value or panicking.
pub(crate) fn c_string(s: String) -> *mut c_char {
    let c = CString::new(s).unwrap_or_else(|err| {
        let mut bytes = err.into_vec();
        bytes.retain(|b| *b != 0);
        CString::new(bytes).unwrap_or_default()
    });
    c.into_raw()
}

pub(crate) fn c_string_opt(s: Option<String>) -> *mut c_char {
    s.map(c_string).unwrap_or(std::ptr::null_mut())
}

/// Length of a list as C sees it, or `None` when it does not fit a `u32`.
/// Checked before anything is allocated for C.
pub(crate) fn c_len(len: usize) -> Option<u32> {
    u32::try_from(len).ok()
}

/// Hand a vector to C as a pointer; pair it with a length from `c_len`.
/// Empty vectors become null.
pub(crate) fn into_raw_slice<T>(items: Vec<T>) -> *mut T {
    if items.is_empty() {
        return std::ptr::null_mut();
    }
    Box::into_raw(items.into_boxed_slice()) as *mut T
}

/// Reclaim a slice produced by `into_raw_slice`.
///
/// # Safety
/// `ptr` must come from `into_raw_slice`, `len` must be the `c_len` of the
/// same vector, and the slice must not have been freed.
pub(crate) unsafe fn from_raw_slice<T>(ptr: *mut T, len: u32) -> Box<[T]> {
    unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len as usize)) }
}

pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `drink_build_*` functions. The C caller executes the request
/// and passes the response back through `drink_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    /// Null when the header count does not fit the C length field.
    pub(crate) fn from_core(req: drinks_core::HttpRequest) -> *mut Self {
        let Some(headers_len) = c_len(req.headers.len()) else {
            return std::ptr::null_mut();
        };
        let headers: Vec<FfiHeader> = req
            .headers
            .into_iter()
            .map(|(k, v)| FfiHeader {
                key: c_string(k),
                value: c_string(v),
            })
            .collect();
        let headers = into_raw_slice(headers);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: c_string(req.url),
            headers,
            headers_len,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to a `drink_parse_*` function. The FFI layer reads
/// but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// Drink category as a C enum. C passes categories in as plain `u32`
/// codes, checked with `category_from_code`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDrinkCategory {
    Cocktail = 0,
    Beer = 1,
    Wine = 2,
    Shot = 3,
    NonAlcoholic = 4,
    Coffee = 5,
}

impl From<DrinkCategory> for FfiDrinkCategory {
    fn from(c: DrinkCategory) -> Self {
        match c {
            DrinkCategory::Cocktail => FfiDrinkCategory::Cocktail,
            DrinkCategory::Beer => FfiDrinkCategory::Beer,
            DrinkCategory::Wine => FfiDrinkCategory::Wine,
            DrinkCategory::Shot => FfiDrinkCategory::Shot,
            DrinkCategory::NonAlcoholic => FfiDrinkCategory::NonAlcoholic,
            DrinkCategory::Coffee => FfiDrinkCategory::Coffee,
        }
    }
}

/// Map a C category code to the core enum.
pub(crate) fn category_from_code(code: u32) -> Option<DrinkCategory> {
    DrinkCategory::ALL.get(code as usize).copied()
}

/// One recipe line exposed to C. `measurement` may be null.
#[repr(C)]
pub struct FfiIngredient {
    pub name: *mut c_char,
    pub measurement: *mut c_char,
}

/// A drink exposed to C. `image_url` may be null; `price` is meaningful
/// only when `has_price` is true.
#[repr(C)]
pub struct FfiDrink {
    pub id: *mut c_char,
    pub name: *mut c_char,
    pub description: *mut c_char,
    pub image_url: *mut c_char,
    pub ingredients: *mut FfiIngredient,
    pub ingredients_len: u32,
    pub instructions: *mut c_char,
    pub category: FfiDrinkCategory,
    pub alcoholic: bool,
    pub has_price: bool,
    pub price: f64,
}

impl FfiDrink {
    /// `None` when the ingredient count does not fit the C length field.
    pub(crate) fn from_core(drink: Drink) -> Option<Self> {
        let ingredients_len = c_len(drink.ingredients.len())?;
        let ingredients: Vec<FfiIngredient> = drink
            .ingredients
            .into_iter()
            .map(|i| FfiIngredient {
                name: c_string(i.name),
                measurement: c_string_opt(i.measurement),
            })
            .collect();
        let ingredients = into_raw_slice(ingredients);

        Some(FfiDrink {
            id: c_string(drink.id),
            name: c_string(drink.name),
            description: c_string(drink.description),
            image_url: c_string_opt(drink.image_url),
            ingredients,
            ingredients_len,
            instructions: c_string(drink.instructions),
            category: drink.category.into(),
            alcoholic: drink.alcoholic,
            has_price: drink.price.is_some(),
            price: drink.price.unwrap_or(0.0),
        })
    }

    /// Free the heap fields of an `FfiDrink` (but not the struct itself).
    pub(crate) fn free_fields(&self) {
        free_c_string(self.id);
        free_c_string(self.name);
        free_c_string(self.description);
        free_c_string(self.image_url);
        free_c_string(self.instructions);
        if !self.ingredients.is_null() {
            let ingredients = unsafe { from_raw_slice(self.ingredients, self.ingredients_len) };
            for ingredient in ingredients.iter() {
                free_c_string(ingredient.name);
                free_c_string(ingredient.measurement);
            }
        }
    }
}

/// A list of drinks exposed to C.
#[repr(C)]
pub struct FfiDrinkList {
    pub items: *mut FfiDrink,
    pub len: u32,
}

/// A list of category names exposed to C.
#[repr(C)]
pub struct FfiCategoryList {
    pub items: *mut *mut c_char,
    pub len: u32,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiDrinkResult`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidUrl = 1,
    NoData = 2,
    Decoding = 3,
    Network = 4,
    ServerStatus = 5,
    Panic = 6,
    NullArg = 7,
    TooLarge = 8,
}

/// Tag that tells `drink_free_result` what `FfiDrinkResult::data` points to.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Drink = 1,
    DrinkList = 2,
    CategoryList = 3,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`; `None` for a lookup
/// that found nothing). On failure `error_code` describes the category,
/// `error_message` is a human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiDrinkResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
}

impl FfiDrinkResult {
    fn ok(data_tag: FfiDataTag, data: *mut std::ffi::c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiDrinkResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn err(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiDrinkResult {
            error_code,
            error_message: c_string(msg),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    /// Success carrying a single `FfiDrink`, or no data when absent.
    pub(crate) fn ok_drink(drink: Option<Drink>) -> *mut Self {
        match drink.map(FfiDrink::from_core) {
            Some(Some(ffi_drink)) => {
                Self::ok(FfiDataTag::Drink, Box::into_raw(Box::new(ffi_drink)) as *mut std::ffi::c_void)
            }
            Some(None) => Self::too_large("ingredients"),
            None => Self::ok(FfiDataTag::None, std::ptr::null_mut()),
        }
    }

    /// Success carrying an `FfiDrinkList`.
    pub(crate) fn ok_drink_list(drinks: Vec<Drink>) -> *mut Self {
        let Some(len) = c_len(drinks.len()) else {
            return Self::too_large("drinks");
        };
        if drinks.iter().any(|d| c_len(d.ingredients.len()).is_none()) {
            return Self::too_large("ingredients");
        }
        let items: Vec<FfiDrink> = drinks.into_iter().filter_map(FfiDrink::from_core).collect();
        let items = into_raw_slice(items);
        let list = Box::new(FfiDrinkList { items, len });
        Self::ok(FfiDataTag::DrinkList, Box::into_raw(list) as *mut std::ffi::c_void)
    }

    /// Success carrying an `FfiCategoryList`.
    pub(crate) fn ok_categories(names: Vec<String>) -> *mut Self {
        let Some(len) = c_len(names.len()) else {
            return Self::too_large("categories");
        };
        let items: Vec<*mut c_char> = names.into_iter().map(c_string).collect();
        let items = into_raw_slice(items);
        let list = Box::new(FfiCategoryList { items, len });
        Self::ok(FfiDataTag::CategoryList, Box::into_raw(list) as *mut std::ffi::c_void)
    }

    /// Error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (code, status) = match &err {
            ApiError::InvalidUrl(_) => (FfiErrorCode::InvalidUrl, 0),
            ApiError::NoData => (FfiErrorCode::NoData, 0),
            ApiError::Decoding(_) => (FfiErrorCode::Decoding, 0),
            ApiError::Network(_) => (FfiErrorCode::Network, 0),
            ApiError::ServerStatus(status) => (FfiErrorCode::ServerStatus, *status),
        };
        Self::err(code, status, err.to_string())
    }

    /// Error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::err(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    /// Error result for a list longer than a `u32` length can describe.
    pub(crate) fn too_large(what: &str) -> *mut Self {
        Self::err(FfiErrorCode::TooLarge, 0, format!("too many {what} for the C ABI"))
    }

    /// Error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::err(FfiErrorCode::Panic, 0, msg.to_string())
    }
}
