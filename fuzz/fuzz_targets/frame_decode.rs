#![no_main]

use libfuzzer_sys::fuzz_target;
use socket_flow_client::read::FrameDecoder;
use tokio::runtime::Runtime;

// Arbitrary bytes as the incoming stream, decoding must only ever fail with an error
fuzz_target!(|data: &[u8]| {
    let runtime = Runtime::new().unwrap();

    runtime.block_on(async move {
        let decoder = FrameDecoder::new(Some(1 << 20), None);
        let mut reader = data;

        while !reader.is_empty() {
            match decoder.read_frame(&mut reader).await {
                Ok(_) => {}
                Err(err) => {
                    println!("{:?}", err);
                    break;
                }
            }
        }
    });
});
