//! 完整回傳流程範例
//!
//! 建立頁面、追蹤變更、編碼為隱藏欄位，再於下一次請求還原。

use anyhow::Result;
use viewstate::vs_controls::{BoundField, ButtonField, CircleHotSpot, HorizontalAlign};
use viewstate::*;

fn declare_page() -> Result<Control> {
    let mut form = Control::new().with_id("form1");
    form.add_child(Control::new().with_id("txtCustomer"))?;
    form.add_child(
        Control::new()
            .with_id("lblHint")
            .with_view_state_mode(ViewStateMode::Disabled),
    )?;

    let mut page = Control::new().with_id("page");
    page.add_child(form)?;
    Ok(page)
}

fn declare_grid() -> Result<GridViewState> {
    let mut grid = GridViewState::new();
    grid.set_allow_paging(true);
    grid.set_page_size(25)?;
    grid.columns_mut().add(BoundField::new("OrderID").into())?;
    grid.columns_mut().add(BoundField::new("ShipCity").into())?;
    grid.header_style_mut().style_mut().set_font_bold(true);
    Ok(grid)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let formatter = StateFormatter::new(StateConfig::new().with_mac_key("demo-machine-key"))?;

    println!("=== 第一次請求 ===");
    let mut page = declare_page()?;
    let mut grid = declare_grid()?;
    let mut spots = HotSpotCollection::new();
    spots.add(CircleHotSpot::new(40, 40, 15)?.into())?;

    page.track_state_recursive();
    grid.track_state();
    spots.track_state();

    if let Some(customer) = page.child_mut(0).and_then(|form| form.child_mut(0)) {
        customer.view_state_mut().set("Text", "ALFKI");
    }
    grid.set_page_index(1)?;
    grid.columns_mut()
        .add(ButtonField::new("Select", "選取").into())?;
    grid.row_style_mut()
        .set_horizontal_align(HorizontalAlign::Center);

    let page_field = save_page(&page, &formatter)?;
    let grid_field = formatter.serialize(grid.save_state().as_ref())?;
    let grid_control_field = formatter.serialize(grid.save_control_state().as_ref())?;
    let spots_field = formatter.serialize(spots.save_state().as_ref())?;

    println!("頁面狀態: {} 字元", page_field.len());
    println!("表格狀態: {} 字元", grid_field.len());
    println!("表格控制狀態: {} 字元", grid_control_field.len());
    println!("熱區狀態: {} 字元（未變更時為空）", spots_field.len());

    println!("\n=== 回傳請求 ===");
    let mut next_page = declare_page()?;
    load_page(&mut next_page, &formatter, &page_field)?;
    next_page.track_state_recursive();

    let mut next_grid = declare_grid()?;
    if let Some(state) = formatter.deserialize(&grid_control_field)? {
        next_grid.load_control_state(&state)?;
    }
    if let Some(state) = formatter.deserialize(&grid_field)? {
        next_grid.load_state(&state)?;
    }
    next_grid.track_state();

    let customer = next_page
        .find_control("txtCustomer")
        .and_then(|c| c.view_state().get_as::<String>("Text"))
        .unwrap_or_default();
    println!("txtCustomer.Text = {}", customer);
    println!("PageIndex = {}", next_grid.page_index());
    println!("PageSize = {}", next_grid.page_size());
    println!("欄位數 = {}", next_grid.columns().len());
    println!(
        "RowStyle.HorizontalAlign = {:?}",
        next_grid.row_style().horizontal_align()
    );

    Ok(())
}
