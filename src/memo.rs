//! Memoization Helpers
//!
//! Call-and-cache wrappers for async functions returning `Result`.
//!
//! Results are stored under `"{function_name}:{sha1(json(args))}"` unless an
//! explicit key or a custom key generator is supplied, where `args` is the
//! JSON argument list. Pass multiple arguments as a tuple; it serializes as
//! a JSON array and is used as the list as-is. Any other argument becomes a
//! one-element list, so `f("x")` hashes `["x"]`.
//!
//! Concurrent calls that derive the same key are not coalesced: each one
//! that misses runs the function, and the last to finish wins the slot.

use std::any::type_name;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use sha1::{Digest, Sha1};
use tracing::{debug, warn};

use crate::cache::{CacheKey, SharedCache};

/// Name used when a function's name cannot be recovered (closures).
pub const ANONYMOUS_FUNCTION: &str = "anonymous_function";

/// Builds a cache key from a function name and its JSON argument list.
pub type KeyGenerator = Arc<dyn Fn(&str, &Value) -> String + Send + Sync>;

// == Options ==
/// Caching parameters for memoized calls.
#[derive(Clone, Default)]
pub struct MemoOptions {
    /// TTL in seconds for stored results (cache default if None)
    pub ttl: Option<u64>,
    /// Tags attached to every stored result
    pub tags: Vec<String>,
    /// Fixed key, overriding key generation
    pub key: Option<CacheKey>,
    /// Custom key generator
    pub key_generator: Option<KeyGenerator>,
    /// Function name used in generated keys
    pub name: Option<String>,
}

impl MemoOptions {
    /// Creates options that use the cache's default TTL, no tags and a generated key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the TTL in seconds for stored results (0 = never expire).
    pub fn with_ttl(mut self, ttl: u64) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the tags attached to every stored result.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Stores every result under `key`, whatever the arguments.
    pub fn with_key(mut self, key: impl Into<CacheKey>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Derives keys with `generator(function_name, argument_list)`.
    pub fn with_key_generator<G>(mut self, generator: G) -> Self
    where
        G: Fn(&str, &Value) -> String + Send + Sync + 'static,
    {
        self.key_generator = Some(Arc::new(generator));
        self
    }

    /// Overrides the function name used in generated keys.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Resolves the cache key for one call.
    ///
    /// Returns None if the arguments cannot be encoded as JSON.
    fn cache_key<A: Serialize>(&self, fn_name: &str, args: &A) -> Option<CacheKey> {
        if let Some(key) = &self.key {
            return Some(key.clone());
        }

        let json = match serde_json::to_value(args) {
            Ok(json) => argument_list(json),
            Err(err) => {
                warn!(
                    "Cannot derive cache key for '{}', calling uncached: {}",
                    fn_name, err
                );
                return None;
            }
        };

        let key = match &self.key_generator {
            Some(generator) => generator(fn_name, &json),
            None => default_key_generator(fn_name, &json),
        };
        Some(CacheKey::Str(key))
    }
}

impl fmt::Debug for MemoOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoOptions")
            .field("ttl", &self.ttl)
            .field("tags", &self.tags)
            .field("key", &self.key)
            .field("key_generator", &self.key_generator.is_some())
            .field("name", &self.name)
            .finish()
    }
}

// == Key Generation ==
/// Tuples already encode as a list; any other value is a single argument.
fn argument_list(args: Value) -> Value {
    match args {
        Value::Array(_) => args,
        single => Value::Array(vec![single]),
    }
}

/// `"{fn_name}:{hex sha1 of the JSON text of args}"`.
pub fn default_key_generator(fn_name: &str, args: &Value) -> String {
    let digest = Sha1::digest(args.to_string().as_bytes());
    format!("{}:{}", fn_name, hex::encode(digest))
}

/// Best-effort name of a function type: the last path segment of its type
/// name, or [`ANONYMOUS_FUNCTION`] for closures.
pub fn function_name<F>() -> String {
    let full = type_name::<F>();
    if full.contains("{{closure}}") {
        return ANONYMOUS_FUNCTION.to_string();
    }

    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path).to_string()
}

// == Cached Call ==
/// Returns the cached result for `f(args)`, or runs `f` and caches its `Ok`.
///
/// Errors from `f` are returned unchanged and nothing is cached for them.
///
/// # Example
/// ```ignore
/// let cache = TagCache::new(0).into_shared();
/// let options = MemoOptions::new().with_ttl(600).with_tags(["users"]);
/// let user = cached_call(&cache, &options, fetch_user, (123,)).await?;
/// ```
pub async fn cached_call<T, A, F, Fut, E>(
    cache: &SharedCache<T>,
    options: &MemoOptions,
    f: F,
    args: A,
) -> Result<T, E>
where
    T: Clone,
    A: Serialize,
    F: FnOnce(A) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let name = options.name.clone().unwrap_or_else(function_name::<F>);
    call_through(cache, options, &name, f, args).await
}

async fn call_through<T, A, F, Fut, E>(
    cache: &SharedCache<T>,
    options: &MemoOptions,
    fn_name: &str,
    f: F,
    args: A,
) -> Result<T, E>
where
    T: Clone,
    A: Serialize,
    F: FnOnce(A) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let key = match options.cache_key(fn_name, &args) {
        Some(key) => key,
        None => return f(args).await,
    };

    let cached = cache.write().await.get(&key);
    if let Some(value) = cached {
        debug!("Memo hit for '{}'", key);
        return Ok(value);
    }

    let value = f(args).await?;

    let tags: Vec<&str> = options.tags.iter().map(String::as_str).collect();
    cache
        .write()
        .await
        .set(key, value.clone(), options.ttl, &tags);

    Ok(value)
}

// == Memoized Function ==
/// An async function bundled with its cache and caching options.
///
/// Every `call` behaves like [`cached_call`] with the same options.
pub struct Memoized<F, T> {
    f: F,
    options: MemoOptions,
    cache: SharedCache<T>,
    name: String,
}

impl<F, T> Memoized<F, T> {
    /// Wraps `f`. The function name is taken from `options.name` or `F`'s type.
    pub fn new(f: F, options: MemoOptions, cache: SharedCache<T>) -> Self {
        let name = options.name.clone().unwrap_or_else(function_name::<F>);
        Self {
            f,
            options,
            cache,
            name,
        }
    }

    /// Name used when generating keys.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cache the results are stored in.
    pub fn cache(&self) -> &SharedCache<T> {
        &self.cache
    }

    /// Returns the cached result for `args`, or runs the function and caches its `Ok`.
    pub async fn call<A, Fut, E>(&self, args: A) -> Result<T, E>
    where
        T: Clone,
        A: Serialize,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        call_through(&self.cache, &self.options, &self.name, |a| (self.f)(a), args).await
    }
}

impl<F, T> fmt::Debug for Memoized<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish()
    }
}
