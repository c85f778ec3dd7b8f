// benches/benchmarks.rs — Performance benchmarks (criterion)

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use townhall::core::classifier;
use townhall::core::escalation::{EscalationDetector, EscalationPolicy};
use townhall::core::suggestions;
use townhall::core::types::Message;

fn bench_classifier(c: &mut Criterion) {
    let question = "Can you give me a comprehensive overview of housing and transportation plans?";

    c.bench_function("token_budget", |b| {
        b.iter(|| classifier::token_budget(black_box(question)))
    });

    c.bench_function("should_show_reasoning", |b| {
        b.iter(|| classifier::should_show_reasoning(black_box(question)))
    });

    c.bench_function("reasoning_steps", |b| {
        let mut rng = StdRng::seed_from_u64(7);
        b.iter(|| classifier::reasoning_steps(black_box(question), &mut rng))
    });
}

fn bench_suggestions(c: &mut Criterion) {
    let reply = "Our housing policy focuses on affordability near the Great Park.";
    let prior: Vec<String> = vec![
        "What's the timeline for policy implementation?".into(),
        "How will new housing impact traffic?".into(),
    ];

    c.bench_function("follow_ups", |b| {
        b.iter(|| suggestions::follow_ups(black_box(reply), black_box(&prior)))
    });
}

fn bench_escalation(c: &mut Criterion) {
    let detector = EscalationDetector::new(EscalationPolicy::ConversationWindow);
    let mut messages = Vec::new();
    for _ in 0..3 {
        messages.push(Message::user("when will housing open?"));
        messages.push(Message::assistant("I'm not sure about the exact dates."));
    }

    c.bench_function("escalation_evaluate", |b| {
        b.iter(|| detector.evaluate(black_box(&messages)))
    });
}

criterion_group!(benches, bench_classifier, bench_suggestions, bench_escalation);
criterion_main!(benches);
