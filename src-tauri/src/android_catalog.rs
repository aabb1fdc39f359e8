// reference
// https://developer.android.com/reference/android/content/pm/PackageManager
// getInstalledApplications
// getApplicationInfo
// getApplicationLabel
// getApplicationIcon

use jni::{
    objects::{JObject, JString, JValue},
    JNIEnv, JavaVM,
};
use log::debug;

use crate::{
    catalog::AppCatalog,
    error::CatalogError,
    icon::{encode_argb_png, IconCache},
    models::{InstalledApp, ShortcutEntry},
};

const ICON_SIZE: i32 = 96;

/// Catalog backed by the Android `PackageManager`, reached through the
/// activity context published by `ndk_context`.
pub struct AndroidCatalog {
    icon_cache: Option<IconCache>,
}

impl AndroidCatalog {
    pub fn new(icon_cache: Option<IconCache>) -> Self {
        Self { icon_cache }
    }
}

impl AppCatalog for AndroidCatalog {
    fn list_installed(&self) -> Result<Vec<InstalledApp>, CatalogError> {
        with_env(|env, context| {
            let pm = package_manager(env, context)?;
            let list = env
                .call_method(
                    &pm,
                    "getInstalledApplications",
                    "(I)Ljava/util/List;",
                    &[JValue::Int(0)],
                )?
                .l()?;
            let size = env.call_method(&list, "size", "()I", &[])?.i()?;

            let mut apps = Vec::with_capacity(size.max(0) as usize);
            for index in 0..size {
                let info = env
                    .call_method(&list, "get", "(I)Ljava/lang/Object;", &[JValue::Int(index)])?
                    .l()?;
                let name = env.get_field(&info, "packageName", "Ljava/lang/String;")?.l()?;
                let flags = env.get_field(&info, "flags", "I")?.i()?;
                apps.push(InstalledApp::new(java_string(env, name)?, flags as u32));
                env.delete_local_ref(info)?;
            }
            Ok(apps)
        })
    }

    fn resolve(&self, package_name: &str) -> Option<ShortcutEntry> {
        let resolved = with_env(|env, context| {
            let pm = package_manager(env, context)?;
            let jname = env.new_string(package_name)?;
            let info = env
                .call_method(
                    &pm,
                    "getApplicationInfo",
                    "(Ljava/lang/String;I)Landroid/content/pm/ApplicationInfo;",
                    &[JValue::Object(&jname), JValue::Int(0)],
                )?
                .l()?;

            let label = env
                .call_method(
                    &pm,
                    "getApplicationLabel",
                    "(Landroid/content/pm/ApplicationInfo;)Ljava/lang/CharSequence;",
                    &[JValue::Object(&info)],
                )?
                .l()?;
            let label = env
                .call_method(&label, "toString", "()Ljava/lang/String;", &[])?
                .l()?;
            let name = java_string(env, label)?;

            let version_code = version_code(env, &pm, &jname).unwrap_or(0);
            let cached = self
                .icon_cache
                .as_ref()
                .and_then(|cache| cache.load(package_name, version_code));
            let icon = match cached {
                Some(icon) => icon,
                None => {
                    let icon = render_icon(env, &pm, &info)?.unwrap_or_default();
                    if let Some(cache) = self.icon_cache.as_ref().filter(|_| !icon.is_empty()) {
                        cache.store(package_name, version_code, &icon);
                    }
                    icon
                }
            };

            Ok(ShortcutEntry::new(package_name, name, icon))
        });

        match resolved {
            Ok(entry) if entry.is_complete() => Some(entry),
            Ok(_) => None,
            Err(err) => {
                debug!("failed to resolve {package_name}: {err}");
                None
            }
        }
    }
}

fn with_env<T, F>(f: F) -> Result<T, CatalogError>
where
    F: FnOnce(&mut JNIEnv, &JObject) -> jni::errors::Result<T>,
{
    let ctx = ndk_context::android_context();
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }.map_err(|_| {
        CatalogError::Unavailable("Expected to find JVM via ndk_context crate".into())
    })?;
    let mut env = vm.attach_current_thread().map_err(|err| {
        CatalogError::Unavailable(format!("Failed to attach current thread: {err}"))
    })?;
    let context = unsafe { JObject::from_raw(ctx.context().cast()) };

    let result = f(&mut env, &context);
    // NameNotFoundException and friends stay pending until cleared.
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }
    result.map_err(|err| CatalogError::Query(err.to_string()))
}

fn package_manager<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject,
) -> jni::errors::Result<JObject<'local>> {
    env.call_method(
        context,
        "getPackageManager",
        "()Landroid/content/pm/PackageManager;",
        &[],
    )?
    .l()
}

fn java_string(env: &mut JNIEnv, value: JObject) -> jni::errors::Result<String> {
    let value = JString::from(value);
    let result: String = env.get_string(&value)?.into();
    env.delete_local_ref(value)?;
    Ok(result)
}

fn version_code(
    env: &mut JNIEnv,
    pm: &JObject,
    package_name: &JString,
) -> jni::errors::Result<i64> {
    let info = env
        .call_method(
            pm,
            "getPackageInfo",
            "(Ljava/lang/String;I)Landroid/content/pm/PackageInfo;",
            &[JValue::Object(package_name), JValue::Int(0)],
        )?
        .l()?;
    Ok(env.get_field(&info, "versionCode", "I")?.i()? as i64)
}

/// Draws the application icon into an ARGB_8888 bitmap and encodes it.
fn render_icon(
    env: &mut JNIEnv,
    pm: &JObject,
    info: &JObject,
) -> jni::errors::Result<Option<String>> {
    let drawable = env
        .call_method(
            pm,
            "getApplicationIcon",
            "(Landroid/content/pm/ApplicationInfo;)Landroid/graphics/drawable/Drawable;",
            &[JValue::Object(info)],
        )?
        .l()?;
    if drawable.is_null() {
        return Ok(None);
    }

    let config = env
        .get_static_field(
            "android/graphics/Bitmap$Config",
            "ARGB_8888",
            "Landroid/graphics/Bitmap$Config;",
        )?
        .l()?;
    let bitmap = env
        .call_static_method(
            "android/graphics/Bitmap",
            "createBitmap",
            "(IILandroid/graphics/Bitmap$Config;)Landroid/graphics/Bitmap;",
            &[JValue::Int(ICON_SIZE), JValue::Int(ICON_SIZE), JValue::Object(&config)],
        )?
        .l()?;
    let canvas = env.new_object(
        "android/graphics/Canvas",
        "(Landroid/graphics/Bitmap;)V",
        &[JValue::Object(&bitmap)],
    )?;
    env.call_method(
        &drawable,
        "setBounds",
        "(IIII)V",
        &[JValue::Int(0), JValue::Int(0), JValue::Int(ICON_SIZE), JValue::Int(ICON_SIZE)],
    )?;
    env.call_method(
        &drawable,
        "draw",
        "(Landroid/graphics/Canvas;)V",
        &[JValue::Object(&canvas)],
    )?;

    let len = ICON_SIZE * ICON_SIZE;
    let array = env.new_int_array(len)?;
    env.call_method(
        &bitmap,
        "getPixels",
        "([IIIIIII)V",
        &[
            JValue::Object(&array),
            JValue::Int(0),
            JValue::Int(ICON_SIZE),
            JValue::Int(0),
            JValue::Int(0),
            JValue::Int(ICON_SIZE),
            JValue::Int(ICON_SIZE),
        ],
    )?;
    let mut pixels = vec![0i32; len as usize];
    env.get_int_array_region(&array, 0, &mut pixels)?;
    env.call_method(&bitmap, "recycle", "()V", &[])?;

    let pixels: Vec<u32> = pixels.into_iter().map(|p| p as u32).collect();
    Ok(encode_argb_png(&pixels, ICON_SIZE as u32, ICON_SIZE as u32))
}
