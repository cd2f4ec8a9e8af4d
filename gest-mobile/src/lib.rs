//! Android entry points for the benchmark view.
//!
//! The Java side owns an opaque `long` handle per view; every native call
//! receives it back. There are no process globals.

#[cfg(target_os = "android")]
mod android;

#[cfg(test)]
mod tests {
    const JAVA_CLASS: &str = "com/android/gpu_emulation_stress_test/GPUEmulationStressTestView";
    const NATIVE_METHODS: [&str; 5] = [
        "nativeCreate",
        "nativeResize",
        "nativeDraw",
        "nativePollResult",
        "nativeDestroy",
    ];

    /// JNI short name for a native method: `_` becomes `_1`, `/` becomes `_`.
    fn jni_symbol(class: &str, method: &str) -> String {
        let mut symbol = String::from("Java_");
        for part in [class, method].iter() {
            for c in part.chars() {
                match c {
                    '_' => symbol.push_str("_1"),
                    '/' => symbol.push('_'),
                    c => symbol.push(c),
                }
            }
            symbol.push('_');
        }
        symbol.pop();
        symbol
    }

    #[test]
    fn test_jni_symbol() {
        assert_eq!(
            jni_symbol(JAVA_CLASS, "nativeDraw"),
            "Java_com_android_gpu_1emulation_1stress_1test_GPUEmulationStressTestView_nativeDraw"
        );
    }

    #[test]
    fn test_exported_symbols_match_java_class() {
        let source = include_str!("android.rs");
        for method in NATIVE_METHODS.iter() {
            let export = format!("pub extern \"system\" fn {}(", jni_symbol(JAVA_CLASS, method));
            assert!(source.contains(&export), "missing export for {}", method);
        }
        assert_eq!(source.matches("#[no_mangle]").count(), NATIVE_METHODS.len());
    }
}
