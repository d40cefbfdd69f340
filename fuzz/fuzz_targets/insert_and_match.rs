#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<(String, String, i32)>, String, String)| {
    let (routes, host, path) = data;
    let mut router = hostmux::Router::new();

    for (host, path, item) in routes {
        if router.add_hostname(host.as_str()).is_err() {
            return;
        }

        if router.insert(host, path, ["GET"], item).is_err() {
            return;
        }
    }

    if router.compile().is_err() {
        return;
    }

    let _ = router.at(&host, &path);
    if let Some(compiled) = router.compiled() {
        for pattern in compiled.hostnames() {
            if let Some(trie) = compiled.trie(pattern.as_str()) {
                let _ = trie.at_all(&path);
            }
        }
    }
});
