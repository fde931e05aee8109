/// Returns a cached value for `$key`, or awaits `$block`, caches its
/// result for `$ttl` seconds and returns it.
///
/// Must be used inside a function returning `AppResult`.
///
/// ```rust,ignore
/// let forecast: Vec<ForecastDay> = cached!(cache, key, FORECAST_CACHE_TTL, async {
///     provider.fetch_uncached(lat, lon, days).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
