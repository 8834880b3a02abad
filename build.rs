// Compiles the vendored subset of Bazel's build_event_stream.proto that the
// event stream consumer (src/bazel/event_stream.rs) needs. See
// proto/build_event_stream.proto for the message subset.

fn main() {
    prost_build::compile_protos(&["proto/build_event_stream.proto"], &["proto"])
        .expect("failed to compile build_event_stream.proto");
}
