#![allow(non_snake_case)]
#![cfg(target_os = "android")]

use std::ffi::{c_void, CString};
use std::ptr::NonNull;

use jni::objects::{JClass, JObject};
use jni::sys::{jfloat, jint, jlong};
use jni::JNIEnv;
use log::{error, info, warn};
use ndk::asset::AssetManager;
use ndk::native_window::NativeWindow;
use raw_window_handle::{
    AndroidDisplayHandle, AndroidNdkWindowHandle, HasRawDisplayHandle, HasRawWindowHandle,
    RawDisplayHandle, RawWindowHandle,
};

use gest::*;

/// Reads bundled files through the NDK asset manager.
struct NdkAssets {
    manager: AssetManager,
}

impl AssetSource for NdkAssets {
    fn load(&self, name: &str) -> Result<Vec<u8>, AssetError> {
        let c_name = CString::new(name).map_err(|_| AssetError::NotFound(name.to_string()))?;
        let mut asset = self
            .manager
            .open(&c_name)
            .ok_or_else(|| AssetError::NotFound(name.to_string()))?;
        let buffer = asset
            .get_buffer()
            .map_err(|err| AssetError::Io(name.to_string(), err))?;
        Ok(buffer.to_vec())
    }
}

struct AndroidWindow(NativeWindow);

unsafe impl HasRawWindowHandle for AndroidWindow {
    fn raw_window_handle(&self) -> RawWindowHandle {
        let mut handle = AndroidNdkWindowHandle::empty();
        handle.a_native_window = self.0.ptr().as_ptr() as *mut c_void;
        RawWindowHandle::AndroidNdk(handle)
    }
}

unsafe impl HasRawDisplayHandle for AndroidWindow {
    fn raw_display_handle(&self) -> RawDisplayHandle {
        RawDisplayHandle::Android(AndroidDisplayHandle::empty())
    }
}

/// Everything one Java view needs between calls. Fields drop in order, so
/// the surface goes before the native window it draws into.
struct ViewHandle {
    view: BenchmarkView,
    screen: BenchmarkScreen,
    surface: Surface,
    _window: AndroidWindow,
    fps: Option<f32>,
}

fn create_handle(
    window: AndroidWindow,
    assets: &dyn AssetSource,
    api_level: i32,
    num_objects: i32,
) -> Result<ViewHandle, Box<dyn std::error::Error>> {
    let request = BenchmarkRequest::new(api_level, num_objects)?;
    let (screen, completion) = BenchmarkScreen::launch(&request.to_extras())?;

    let size = [window.0.width().max(1) as u32, window.0.height().max(1) as u32];
    let surface = pollster::block_on(Surface::new(size, &window))?;
    if !surface.supports(request.api_level) {
        return Err(Box::new(RenderError::Unsupported(request.api_level)));
    }

    let view = BenchmarkView::initialize(assets, screen.request(), completion)?;
    Ok(ViewHandle {
        view,
        screen,
        surface,
        _window: window,
        fps: None,
    })
}

unsafe fn handle_mut<'a>(handle: jlong) -> Option<&'a mut ViewHandle> {
    (handle as *mut ViewHandle).as_mut()
}

/// Returns a handle for the other calls, or 0 if the benchmark can't start.
#[no_mangle]
pub extern "system" fn Java_com_android_gpu_1emulation_1stress_1test_GPUEmulationStressTestView_nativeCreate(
    env: JNIEnv,
    _class: JClass,
    surface: JObject,
    assetManager: JObject,
    apiLevel: jint,
    numObjects: jint,
) -> jlong {
    let window = unsafe {
        NonNull::new(ndk_sys::ANativeWindow_fromSurface(
            env.get_raw(),
            surface.as_raw(),
        ))
        .map(|ptr| NativeWindow::from_ptr(ptr))
    };
    let assetManager = unsafe {
        NonNull::new(ndk_sys::AAssetManager_fromJava(
            env.get_raw(),
            assetManager.as_raw(),
        ))
        .map(|ptr| AssetManager::from_ptr(ptr))
    };
    let (window, manager) = match (window, assetManager) {
        (Some(window), Some(manager)) => (window, manager),
        _ => {
            error!("nativeCreate: missing surface or asset manager");
            return 0;
        }
    };

    let assets = NdkAssets { manager };
    match create_handle(AndroidWindow(window), &assets, apiLevel, numObjects) {
        Ok(handle) => {
            info!("benchmark view created");
            Box::into_raw(Box::new(handle)) as jlong
        }
        Err(err) => {
            error!("can't create benchmark view ({})", err);
            0
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_com_android_gpu_1emulation_1stress_1test_GPUEmulationStressTestView_nativeResize(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
    width: jint,
    height: jint,
) {
    if let Some(handle) = unsafe { handle_mut(handle) } {
        let (width, height) = (width.max(0) as u32, height.max(0) as u32);
        if let Err(err) = handle.view.on_resize(&handle.surface, width, height) {
            error!("resize failed ({})", err);
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_com_android_gpu_1emulation_1stress_1test_GPUEmulationStressTestView_nativeDraw(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) {
    if let Some(handle) = unsafe { handle_mut(handle) } {
        if let Err(err) = handle.view.on_draw_frame(&handle.surface) {
            error!("frame failed ({})", err);
        }
    }
}

/// Average fps once the run is over, -1 while it is still going.
#[no_mangle]
pub extern "system" fn Java_com_android_gpu_1emulation_1stress_1test_GPUEmulationStressTestView_nativePollResult(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jfloat {
    let handle = match unsafe { handle_mut(handle) } {
        Some(handle) => handle,
        None => return -1.0,
    };
    if handle.fps.is_none() {
        handle.fps = handle
            .screen
            .poll()
            .as_ref()
            .and_then(BenchmarkResult::from_extras)
            .map(|result| result.fps);
    }
    handle.fps.unwrap_or(-1.0)
}

#[no_mangle]
pub extern "system" fn Java_com_android_gpu_1emulation_1stress_1test_GPUEmulationStressTestView_nativeDestroy(
    _env: JNIEnv,
    _class: JClass,
    handle: jlong,
) {
    if handle == 0 {
        warn!("nativeDestroy on a null handle");
        return;
    }
    let mut handle = unsafe { Box::from_raw(handle as *mut ViewHandle) };
    handle.screen.destroy();
}
