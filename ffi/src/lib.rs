//! C-ABI wrapper around `drinks-core`.
//!
//! # Overview
//! Exposes the cocktail API client through `extern "C"` functions so a
//! mobile host (Swift, Kotlin via JNI, anything with a C FFI) can build
//! requests and parse responses while doing the HTTP itself with its
//! platform stack. The core is linked without its transport and view-model
//! features.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-endpoint `build_*` / `parse_*` mirrors the core API 1:1.
//! - A single `FfiDrinkResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `drink_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::str::Utf8Error;
use std::os::raw::c_char;
use std::panic::{catch_unwind, UnwindSafe};

use drinks_core::{ApiError, DrinkCategory, DrinkClient, HttpRequest, HttpResponse};
use tracing::trace;

use types::*;

/// Borrow a non-null C string as UTF-8.
fn read_str<'a>(s: *const c_char) -> Result<&'a str, Utf8Error> {
    unsafe { CStr::from_ptr(s) }.to_str()
}

/// A string argument, or `None` when it is null or not UTF-8.
fn str_arg<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    read_str(s).ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `DrinkClient` bound to `base_url`.
///
/// Returns null if `base_url` is null or not UTF-8, or if an internal
/// panic occurs.
/// The caller must free the returned pointer with `drink_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn drink_client_new(base_url: *const c_char) -> *mut FfiDrinkClient {
    catch_unwind(|| {
        let Some(base_url) = str_arg(base_url) else {
            return std::ptr::null_mut();
        };
        let client = DrinkClient::new(base_url);
        Box::into_raw(Box::new(FfiDrinkClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a `DrinkClient` created by `drink_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn drink_client_free(client: *mut FfiDrinkClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

/// Static display label for a category code, or null for an unknown code.
/// The returned string must not be freed.
#[unsafe(no_mangle)]
pub extern "C" fn drink_category_label(category: u32) -> *const c_char {
    catch_unwind(|| match category_from_code(category) {
        Some(DrinkCategory::Cocktail) => c"Cocktail".as_ptr(),
        Some(DrinkCategory::Beer) => c"Beer".as_ptr(),
        Some(DrinkCategory::Wine) => c"Wine".as_ptr(),
        Some(DrinkCategory::Shot) => c"Shot".as_ptr(),
        Some(DrinkCategory::NonAlcoholic) => c"Non-Alcoholic".as_ptr(),
        Some(DrinkCategory::Coffee) => c"Coffee".as_ptr(),
        None => std::ptr::null(),
    })
    .unwrap_or(std::ptr::null())
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Run `build` against the client behind `client`, returning null for a
/// null client, a build error, or a panic.
fn build_with<F>(client: *const FfiDrinkClient, build: F) -> *mut FfiHttpRequest
where
    F: FnOnce(&DrinkClient) -> Option<Result<HttpRequest, ApiError>> + UnwindSafe,
{
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match build(&client.inner) {
            Some(Ok(req)) => FfiHttpRequest::from_core(req),
            Some(Err(err)) => {
                trace!(error = %err, "request not built");
                std::ptr::null_mut()
            }
            None => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a search-by-name request. `name` is percent-encoded.
///
/// Returns null if `client` or `name` is null, or `name` is not UTF-8.
/// The caller must free the returned pointer with `drink_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn drink_build_search(client: *const FfiDrinkClient, name: *const c_char) -> *mut FfiHttpRequest {
    build_with(client, |c| str_arg(name).map(|name| c.build_search(name)))
}

/// Build a lookup-by-id request.
///
/// Returns null if `client` or `id` is null, or if `id` is not UTF-8 or
/// not a plain alphanumeric drink id.
#[unsafe(no_mangle)]
pub extern "C" fn drink_build_lookup(client: *const FfiDrinkClient, id: *const c_char) -> *mut FfiHttpRequest {
    build_with(client, |c| str_arg(id).map(|id| c.build_lookup(id)))
}

/// Build a random-drink request. Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn drink_build_random(client: *const FfiDrinkClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.build_random()))
}

/// Build a filter-by-category request. `category` is an `FfiDrinkCategory`
/// discriminant; unknown codes return null.
#[unsafe(no_mangle)]
pub extern "C" fn drink_build_filter(client: *const FfiDrinkClient, category: u32) -> *mut FfiHttpRequest {
    build_with(client, |c| category_from_code(category).map(|cat| c.build_filter(cat)))
}

/// Build a list-categories request. Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn drink_build_categories(client: *const FfiDrinkClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.build_categories()))
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body is
/// read as empty. A body that is not UTF-8 is a `Decoding` error on a 2xx
/// response; on any other status the status code is what gets reported.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> Result<HttpResponse, ApiError> {
    if resp.body.is_null() {
        return Ok(HttpResponse::new(resp.status, ""));
    }
    match read_str(resp.body) {
        Ok(body) => Ok(HttpResponse::new(resp.status, body)),
        Err(err) => {
            let response = HttpResponse::new(resp.status, "");
            if response.is_success() {
                Err(ApiError::Decoding(format!("response body is not UTF-8: {err}")))
            } else {
                Ok(response)
            }
        }
    }
}

/// Shared null checks and panic guard for the `drink_parse_*` functions.
fn parse_with<F>(
    entry: &str,
    client: *const FfiDrinkClient,
    response: *const FfiHttpResponse,
    parse: F,
) -> *mut FfiDrinkResult
where
    F: FnOnce(&DrinkClient, HttpResponse) -> *mut FfiDrinkResult + UnwindSafe,
{
    catch_unwind(|| {
        if client.is_null() {
            return FfiDrinkResult::null_arg("client");
        }
        if response.is_null() {
            return FfiDrinkResult::null_arg("response");
        }
        let client = unsafe { &*client };
        match ffi_response_to_core(unsafe { &*response }) {
            Ok(resp) => parse(&client.inner, resp),
            Err(err) => FfiDrinkResult::from_error(err),
        }
    })
    .unwrap_or_else(|_| FfiDrinkResult::panic(&format!("panic in {entry}")))
}

/// Parse a search or filter response.
///
/// Returns a result with `data_tag = DrinkList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn drink_parse_drink_list(
    client: *const FfiDrinkClient,
    response: *const FfiHttpResponse,
) -> *mut FfiDrinkResult {
    parse_with("drink_parse_drink_list", client, response, |c, resp| {
        match c.parse_drink_list(resp) {
            Ok(drinks) => FfiDrinkResult::ok_drink_list(drinks),
            Err(e) => FfiDrinkResult::from_error(e),
        }
    })
}

/// Parse a lookup or random response.
///
/// Returns `data_tag = Drink` on success, or `data_tag = None` with
/// `error_code = Ok` when the server had no matching drink.
#[unsafe(no_mangle)]
pub extern "C" fn drink_parse_drink(
    client: *const FfiDrinkClient,
    response: *const FfiHttpResponse,
) -> *mut FfiDrinkResult {
    parse_with("drink_parse_drink", client, response, |c, resp| match c.parse_drink(resp) {
        Ok(drink) => FfiDrinkResult::ok_drink(drink),
        Err(e) => FfiDrinkResult::from_error(e),
    })
}

/// Parse a list-categories response.
///
/// Returns a result with `data_tag = CategoryList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn drink_parse_categories(
    client: *const FfiDrinkClient,
    response: *const FfiHttpResponse,
) -> *mut FfiDrinkResult {
    parse_with("drink_parse_categories", client, response, |c, resp| {
        match c.parse_categories(resp) {
            Ok(names) => FfiDrinkResult::ok_categories(names),
            Err(e) => FfiDrinkResult::from_error(e),
        }
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `drink_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn drink_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        if !req.headers.is_null() {
            let headers = unsafe { from_raw_slice(req.headers, req.headers_len) };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiDrinkResult` returned by any `drink_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn drink_free_result(result: *mut FfiDrinkResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Drink => {
                let drink = unsafe { Box::from_raw(result.data as *mut FfiDrink) };
                drink.free_fields();
            }
            FfiDataTag::DrinkList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiDrinkList) };
                if !list.items.is_null() {
                    let items = unsafe { from_raw_slice(list.items, list.len) };
                    for item in items.iter() {
                        item.free_fields();
                    }
                }
            }
            FfiDataTag::CategoryList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiCategoryList) };
                if !list.items.is_null() {
                    let items = unsafe { from_raw_slice(list.items, list.len) };
                    for name in items.iter() {
                        free_c_string(*name);
                    }
                }
            }
            FfiDataTag::None => {}
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn drink_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
