use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tv_ascii::compositor::Compositor;
use tv_core::charset::Charset;
use tv_core::config::CharsetMode;
use tv_core::frame::{Channels, Frame};

fn gradient(w: u32, h: u32) -> Frame {
    let mut frame = Frame::new(w, h, Channels::Rgb);
    for (i, px) in frame.data.chunks_exact_mut(3).enumerate() {
        let x = (i as u32 % w) * 255 / w.max(1);
        let y = (i as u32 / w) * 255 / h.max(1);
        px.copy_from_slice(&[x as u8, y as u8, 128]);
    }
    frame
}

fn bench_compositor(c: &mut Criterion) {
    let cells = gradient(200, 56);
    for (name, batched, color) in [
        ("scalar_color", false, true),
        ("batched_color", true, true),
        ("scalar_mono", false, false),
        ("batched_mono", true, false),
    ] {
        let mut compositor = Compositor::new(Charset::for_mode(CharsetMode::Ascii), color, batched);
        c.bench_function(name, |b| {
            b.iter(|| black_box(compositor.render(black_box(&cells)).len()));
        });
    }
}

criterion_group!(benches, bench_compositor);
criterion_main!(benches);
