use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use loadsensor::core::{
    sensors::{FnSensor, Sensor, SensorCall, SensorError},
    Engine, EngineError, StreamError,
};

async fn drive(engine: &Engine, input: &str) -> (Result<(), StreamError>, String) {
    let mut output = Vec::new();
    let result = engine.run(input.as_bytes(), &mut output).await;
    (result, String::from_utf8(output).expect("protocol output is utf-8"))
}

#[tokio::test]
async fn reports_healthy_sensor_and_drops_failing_one() {
    let sensors: Vec<Box<dyn Sensor>> = vec![
        Box::new(FnSensor::new(
            || Ok("hostA".into()),
            || Ok("mem".into()),
            || Ok("42".into()),
        )),
        Box::new(FnSensor::new(
            || Ok("hostB".into()),
            || Ok("disk".into()),
            || Err(SensorError::other("device not ready")),
        )),
    ];
    let engine = Engine::create(sensors).unwrap();

    let (result, out) = drive(&engine, "poll\nquit\n").await;

    assert!(result.is_ok(), "quit must end the loop cleanly");
    assert_eq!(out, "begin\nhostA:mem:42\nend\n");
}

#[tokio::test]
async fn values_are_fresh_every_cycle() {
    let ticks = Arc::new(AtomicU32::new(0));
    let counter = ticks.clone();
    let sensors: Vec<Box<dyn Sensor>> = vec![Box::new(FnSensor::new(
        || Ok("n1".into()),
        || Ok("jobs".into()),
        move || Ok(counter.fetch_add(1, Ordering::SeqCst).to_string()),
    ))];
    let engine = Engine::create(sensors).unwrap();

    let (result, out) = drive(&engine, "\n\n\n").await;

    assert!(matches!(result, Err(StreamError::EndOfInput)));
    assert_eq!(
        out,
        "begin\nn1:jobs:0\nend\nbegin\nn1:jobs:1\nend\nbegin\nn1:jobs:2\nend\n"
    );
}

#[tokio::test]
async fn every_block_is_framed() {
    let sensors: Vec<Box<dyn Sensor>> = (0..5)
        .map(|i| {
            let fails = i % 2 == 1;
            Box::new(FnSensor::new(
                || Ok("h".into()),
                move || Ok(format!("r{i}")),
                move || {
                    if fails {
                        Err(SensorError::other("odd sensor"))
                    } else {
                        Ok(i.to_string())
                    }
                },
            )) as Box<dyn Sensor>
        })
        .collect();
    let engine = Engine::create(sensors).unwrap();

    let (_, out) = drive(&engine, "1\n2\n3\n4\n5\n6\n7\nquit\n").await;

    let lines: Vec<&str> = out.lines().collect();
    let blocks: Vec<&[&str]> = lines.split(|l| *l == "end").filter(|b| !b.is_empty()).collect();
    assert_eq!(blocks.len(), 7);
    for block in blocks {
        assert_eq!(block, ["begin", "h:r0:0", "h:r2:2", "h:r4:4"]);
    }
    assert_eq!(lines.last(), Some(&"end"));
}

#[test]
fn incomplete_sensor_prevents_engine() {
    let sensors: Vec<Box<dyn Sensor>> = vec![Box::new(
        FnSensor::default()
            .with_host_name(|| Ok("h".into()))
            .with_resource_name(|| Ok("r".into())),
    )];

    match Engine::create(sensors) {
        Err(e) => assert_eq!(
            e,
            EngineError::MissingCallback {
                index: 0,
                call: SensorCall::Measurement
            }
        ),
        Ok(_) => panic!("engine built from an incomplete sensor"),
    }
}
