use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hello_server::templates::Templates;

fn render_hello_world(c: &mut Criterion) {
    let templates = Templates::new().unwrap();
    c.bench_function("render_hello_world", |b| {
        b.iter(|| {
            templates
                .render_hello_world(black_box("title"), black_box("msg"))
                .unwrap()
        })
    });
}

criterion_group!(benches, render_hello_world);
criterion_main!(benches);
