use sprig_core::{
    class, create_element, element, use_effect_with, use_shared_state, ClassContext, Component,
    Config, FunctionComponent, Props, VNode,
};

/// Shared-state key observed by [`COUNTER_A`] and [`COUNTER_B`].
pub const SHARED_COUNT: &str = "shared-count";

/// Class-style counter: local state through the updater, lifecycle logging.
pub struct Counter {
    title: String,
}

impl Component for Counter {
    type State = i64;

    fn create(props: &Props) -> Self {
        Self {
            title: props.get_str("title").unwrap_or("Counter").to_string(),
        }
    }

    fn initial_state(&self, props: &Props) -> i64 {
        props.get_int("start").unwrap_or(0)
    }

    fn render(&self, cx: &ClassContext<'_, Self>) -> VNode {
        let increment = cx.updater().clone();
        let decrement = cx.updater().clone();
        element!(
            "section",
            Config::new().class_name("counter"),
            element!("h2", Config::new(), self.title.as_str()),
            element!("span", Config::new().class_name("value"), *cx.state()),
            element!(
                "button",
                Config::new()
                    .attr("id", "increment")
                    .on("click", move |_| increment.set_state(|count| count + 1)),
                "+"
            ),
            element!(
                "button",
                Config::new()
                    .attr("id", "decrement")
                    .on("click", move |_| decrement.set_state(|count| count - 1)),
                "-"
            ),
        )
    }

    fn did_mount(&mut self, cx: &ClassContext<'_, Self>) {
        log::info!("{} mounted at {}", self.title, cx.state());
    }

    fn did_update(&mut self, cx: &ClassContext<'_, Self>, _prev_props: &Props, prev_state: &i64) {
        log::info!("{}: {prev_state} -> {}", self.title, cx.state());
    }

    fn will_unmount(&mut self, _cx: &ClassContext<'_, Self>) {
        log::info!("{} unmounting", self.title);
    }
}

fn counter_a(_props: &Props) -> VNode {
    let (count, _) = use_shared_state(SHARED_COUNT, || 0_i64);
    use_effect_with(count, move || log::debug!("CounterA sees {count}"));
    element!("p", Config::new().class_name("shared-a"), "A: ", count)
}

fn counter_b(_props: &Props) -> VNode {
    let (count, set_count) = use_shared_state(SHARED_COUNT, || 0_i64);
    element!(
        "p",
        Config::new().class_name("shared-b"),
        "B: ",
        count,
        element!(
            "button",
            Config::new()
                .attr("id", "shared-increment")
                .on("click", move |_| {
                    set_count.update(|count| count + 1);
                }),
            "+"
        ),
    )
}

pub const COUNTER_A: FunctionComponent = FunctionComponent::new("CounterA", counter_a);
pub const COUNTER_B: FunctionComponent = FunctionComponent::new("CounterB", counter_b);

/// The demo tree: a class counter above two function components that share
/// one store key.
pub fn combined_app() -> VNode {
    create_element(
        "main",
        Config::new(),
        [
            element!(class::<Counter>(), Config::new().set("title", "Clicks").set("start", 0)),
            element!(COUNTER_A, Config::new().key("a")),
            element!(COUNTER_B, Config::new().key("b")),
        ],
    )
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
