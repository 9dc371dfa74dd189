use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use feeds::{LocationItem, NO_PERIOD_DETAIL, StatusView, TyphoonStatus, WeatherStatus};
use layers::classify::escape_html;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

/// Called with the index of a clicked weather item header.
pub type ToggleSink = Rc<dyn Fn(usize)>;

fn element(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| JsValue::from_str(&format!("#{id} is not an HTML element")))
}

/// Hands the error of a failed call to `log`. Returns whether the call succeeded.
fn report_to<T, E>(result: Result<T, E>, log: impl FnOnce(E)) -> bool {
    match result {
        Ok(_) => true,
        Err(err) => {
            log(err);
            false
        }
    }
}

/// Logs a failed DOM call to the console.
pub fn report<T>(result: Result<T, JsValue>) {
    report_to(result, |err| web_sys::console::error_1(&err));
}

fn show(el: &HtmlElement, visible: bool) {
    report(
        el.style()
            .set_property("display", if visible { "block" } else { "none" }),
    );
}

fn inline_error(message: &str) -> String {
    format!("<p style=\"color: red;\">{}</p>", escape_html(message))
}

fn item_body(item: &LocationItem) -> String {
    if item.periods.is_empty() {
        return format!("<p>{NO_PERIOD_DETAIL}</p>");
    }
    let mut html = String::new();
    for card in &item.periods {
        let _ = write!(
            html,
            "<div class=\"forecast-detail-card\"><h5>{}</h5>\
             <p>Weather: <strong>{}</strong></p>\
             <p>Temperature: <strong>{}</strong></p>\
             <p>Chance of rain: <strong>{}</strong></p></div>",
            escape_html(&card.span),
            escape_html(&card.weather),
            escape_html(&card.temperature()),
            escape_html(&card.rain()),
        );
    }
    html
}

/// Renders panel state into the page's weather and typhoon sections.
pub struct DomStatusView {
    document: Document,
    weather_display: HtmlElement,
    weather_loading: HtmlElement,
    typhoon_display: HtmlElement,
    typhoon_loading: HtmlElement,
    weather_items: RefCell<Vec<Element>>,
    header_listeners: RefCell<Vec<Closure<dyn FnMut()>>>,
    on_toggle: ToggleSink,
}

impl DomStatusView {
    pub fn new(document: Document, on_toggle: ToggleSink) -> Result<Self, JsValue> {
        Ok(Self {
            weather_display: element(&document, "all-weather-display")?,
            weather_loading: element(&document, "loading-weather-message")?,
            typhoon_display: element(&document, "typhoon-display")?,
            typhoon_loading: element(&document, "loading-typhoon-message")?,
            document,
            weather_items: RefCell::new(Vec::new()),
            header_listeners: RefCell::new(Vec::new()),
            on_toggle,
        })
    }

    fn clear_weather_items(&self) {
        self.weather_display.set_inner_html("");
        self.weather_items.borrow_mut().clear();
        self.header_listeners.borrow_mut().clear();
    }

    fn render_items(&self, items: &[LocationItem]) -> Result<(), JsValue> {
        for (index, item) in items.iter().enumerate() {
            let entry = self.document.create_element("div")?;
            entry.set_class_name("accordion-item");

            let header = self.document.create_element("div")?;
            header.set_class_name("accordion-header");
            header.set_inner_html(&format!("<h4>{}</h4>", escape_html(&item.name)));

            let body = self.document.create_element("div")?;
            body.set_class_name("accordion-content");
            body.set_inner_html(&item_body(item));

            entry.append_child(&header)?;
            entry.append_child(&body)?;
            self.weather_display.append_child(&entry)?;

            let sink = self.on_toggle.clone();
            let listener = Closure::<dyn FnMut()>::new(move || sink(index));
            header.add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())?;

            self.weather_items.borrow_mut().push(entry);
            self.header_listeners.borrow_mut().push(listener);
        }
        Ok(())
    }
}

impl StatusView for DomStatusView {
    fn show_weather(&self, status: WeatherStatus<'_>) {
        match status {
            WeatherStatus::Loading => {
                show(&self.weather_loading, true);
                self.clear_weather_items();
            }
            WeatherStatus::Ready(panel) => {
                show(&self.weather_loading, false);
                self.clear_weather_items();
                report(self.render_items(panel.items()));
            }
            WeatherStatus::Empty | WeatherStatus::Failed(_) => {
                show(&self.weather_loading, false);
                self.clear_weather_items();
                if let Some(message) = status.message() {
                    self.weather_display.set_inner_html(&inline_error(&message));
                }
            }
        }
    }

    fn show_typhoon(&self, status: TyphoonStatus<'_>) {
        match status {
            TyphoonStatus::Loading => {
                show(&self.typhoon_loading, true);
                self.typhoon_display.set_inner_html("");
            }
            TyphoonStatus::Ready(_) | TyphoonStatus::NotReady => {
                show(&self.typhoon_loading, false);
            }
            TyphoonStatus::Failed(_) => {
                show(&self.typhoon_loading, false);
                if let Some(message) = status.message() {
                    self.typhoon_display.set_inner_html(&inline_error(&message));
                }
            }
        }
    }

    fn sync_weather_open(&self, open: &[bool]) {
        for (entry, open) in self.weather_items.borrow().iter().zip(open) {
            report(entry.class_list().toggle_with_force("active", *open));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::report_to;

    #[test]
    fn failures_reach_the_log_and_successes_do_not() {
        let mut logged = Vec::new();
        assert!(report_to(Ok::<_, String>(()), |e| logged.push(e)));
        assert!(!report_to(Err::<(), _>("no such element".to_string()), |e| logged.push(e)));
        assert_eq!(logged, vec!["no such element".to_string()]);
    }
}
