use super::*;

#[test]
fn align_to_rounds_up_to_copy_alignment() {
    assert_eq!(align_to(0, 256), 0);
    assert_eq!(align_to(1, 256), 256);
    assert_eq!(align_to(256, 256), 256);
    assert_eq!(align_to(64 * 4, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT), 256);
    assert_eq!(align_to(65 * 4, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT), 512);
}

#[test]
fn shader_declares_every_entry_point() {
    for entry in ["vs_stencil", "fs_stencil", "vs_warp", "fs_warp"] {
        assert!(SHADER.contains(&format!("fn {entry}(")), "missing {entry}");
    }
}

#[test]
fn shader_palette_matches_the_cpu_program() {
    use crate::render::program::{DEBUG_FALLBACK, DEBUG_PALETTE};
    let entries: Vec<String> = DEBUG_PALETTE
        .iter()
        .map(|c| format!("    vec4<f32>({:?}, {:?}, {:?}, {:?}),", c[0], c[1], c[2], c[3]))
        .collect();
    let table = entries.join("\n");
    assert!(SHADER.contains(&table), "palette table differs from the cpu program");
    assert!(SHADER.contains(&format!("array<vec4<f32>, {}>", DEBUG_PALETTE.len())));

    let f = DEBUG_FALLBACK;
    let fallback = format!("return vec4<f32>({:?}, {:?}, {:?}, {:?});", f[0], f[1], f[2], f[3]);
    assert!(SHADER.contains(&fallback));
}
